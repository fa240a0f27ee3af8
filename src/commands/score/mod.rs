use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use crate::cli::{DateOrder, ScoreArgs};
use crate::model::{
    AccuracyReportManifest, Difficulty, FieldCategory, FieldStats, InputProvenance, MatchMethod,
    Outcome, OutcomeCounts, RecordJudgment, ScoreInputs, ScoreSettings,
};
use crate::util::{
    load_json_file, now_utc_string, sha256_file, utc_compact_string, write_json_pretty,
};

const REPORT_MANIFEST_VERSION: u32 = 1;

mod aggregate;
mod catalog;
mod classify;
mod dataset;
mod normalize;
mod run;
#[cfg(test)]
mod tests;

pub use run::run;

use aggregate::*;
use catalog::*;
use classify::*;
use dataset::*;
use normalize::*;
