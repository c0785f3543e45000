// src/cli.rs
//! Turns command-line strings into typed query parameters. Range checks
//! (region ids, percent domain) stay with the query engine.

use std::{collections::BTreeSet, str::FromStr};

use crate::{
    error::ValidationError,
    query::{DroughtYears, GroupedStatistics, PointLookup, RangedSeries},
};

pub const USAGE: &str = "\
usage: vhiscraper [--fetch] <command>

commands:
  summary                          build report and row count
  series <region_id> <year>        weekly VHI of one region in one year
  stats <ids> <years>              min/max/mean/median, e.g. stats 1,2,3 2010,2020
  range <ids> <year_start> <year_end>
                                   rows for the regions within the year range
  drought <percent>                years where >= percent of 25 regions had VHI < 15";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Summary,
    Series(PointLookup),
    Stats(GroupedStatistics),
    Range(RangedSeries),
    Drought(DroughtYears),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Download missing exports before building the dataset.
    pub fetch: bool,
    pub command: Command,
}

/// Parse arguments without the program name.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation, ValidationError> {
    let mut fetch = false;
    let mut rest: Vec<&str> = Vec::with_capacity(args.len());
    for arg in args {
        match arg.as_ref() {
            "--fetch" => fetch = true,
            other => rest.push(other),
        }
    }

    let command = match rest.as_slice() {
        ["summary"] => Command::Summary,
        ["series", id, year] => Command::Series(PointLookup {
            region_id: parse_one(id, "region id")?,
            year: parse_one(year, "year")?,
        }),
        ["stats", ids, years] => Command::Stats(GroupedStatistics {
            region_ids: parse_list(ids, "region id list")?,
            years: parse_list(years, "year list")?,
        }),
        ["range", ids, start, end] => Command::Range(RangedSeries {
            region_ids: parse_list(ids, "region id list")?,
            year_start: parse_one(start, "year")?,
            year_end: parse_one(end, "year")?,
        }),
        ["drought", percent] => Command::Drought(DroughtYears {
            percent: parse_one(percent, "percentage")?,
        }),
        _ => {
            return Err(ValidationError::Malformed {
                what: "command",
                input: rest.join(" "),
            })
        }
    };
    Ok(Invocation { fetch, command })
}

fn parse_one<T: FromStr>(raw: &str, what: &'static str) -> Result<T, ValidationError> {
    raw.trim().parse().map_err(|_| ValidationError::Malformed {
        what,
        input: raw.to_string(),
    })
}

/// Comma-separated list such as `1,2, 3`. Empty items are malformed.
pub fn parse_list<T: FromStr + Ord>(
    raw: &str,
    what: &'static str,
) -> Result<BTreeSet<T>, ValidationError> {
    raw.split(',')
        .map(|item| parse_one(item, what))
        .collect::<Result<BTreeSet<T>, _>>()
        .map_err(|_| ValidationError::Malformed {
            what,
            input: raw.to_string(),
        })
}
