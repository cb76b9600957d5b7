//! Partition path derivation
//!
//! Turns a base path, dataset type, date list and optional partition
//! dimension into the ordered list of storage prefixes to operate on.
//! Segments always appear in the order `type=`, `date=`, then the
//! partition key, and a later segment is only emitted when every earlier
//! one is present.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::Serialize;

use crate::dates;
use crate::error::{Error, Result};

/// The kinds of dataset stored under an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    Decisions,
    Events,
}

impl DatasetType {
    pub const fn as_str(self) -> &'static str {
        match self {
            DatasetType::Decisions => "decisions",
            DatasetType::Events => "events",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "decisions" => Ok(DatasetType::Decisions),
            "events" => Ok(DatasetType::Events),
            other => Err(Error::Validation(format!(
                "Invalid dataset type '{other}': expected 'decisions' or 'events'"
            ))),
        }
    }
}

/// Optional extra path segment narrowing a dataset below its date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PartitionDimension {
    #[default]
    None,
    Experiment(String),
    Event(String),
}

impl PartitionDimension {
    /// Build from the two mutually exclusive CLI options
    pub fn from_options(experiment: Option<&str>, event: Option<&str>) -> Result<Self> {
        match (experiment, event) {
            (Some(_), Some(_)) => Err(Error::Validation(
                "--experiment and --event cannot be used together".into(),
            )),
            (Some(id), None) => Ok(PartitionDimension::Experiment(segment_value("experiment", id)?)),
            (None, Some(name)) => Ok(PartitionDimension::Event(segment_value("event", name)?)),
            (None, None) => Ok(PartitionDimension::None),
        }
    }

    /// `key=value` segment, or None when no dimension is active
    pub fn segment(&self) -> Option<String> {
        match self {
            PartitionDimension::None => None,
            PartitionDimension::Experiment(id) => Some(format!("experiment={id}")),
            PartitionDimension::Event(name) => Some(format!("event={name}")),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, PartitionDimension::None)
    }
}

/// A partition value must fill exactly one path segment
fn segment_value(option: &str, value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("--{option} cannot be empty")));
    }
    if value.contains('/') {
        return Err(Error::Validation(format!(
            "Invalid --{option} '{value}': must not contain '/'"
        )));
    }
    Ok(value.to_string())
}

/// Resolved inputs for path derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    base_path: String,
    dataset_type: Option<DatasetType>,
    dates: Vec<Date>,
    partition: PartitionDimension,
}

impl PathSpec {
    /// Validate raw options into a spec
    ///
    /// The dataset type must name a known type and the dates must form a
    /// valid range. `base_path` gains a trailing `/` if it lacks one.
    pub fn new(
        base_path: &str,
        dataset_type: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        partition: PartitionDimension,
    ) -> Result<Self> {
        let dataset_type = dataset_type.map(str::parse).transpose()?;
        let start = start.map(dates::parse_date).transpose()?;
        let end = end.map(dates::parse_date).transpose()?;
        let dates = dates::expand(start, end)?;
        Ok(Self::from_parts(base_path, dataset_type, dates, partition))
    }

    pub fn from_parts(
        base_path: &str,
        dataset_type: Option<DatasetType>,
        dates: Vec<Date>,
        partition: PartitionDimension,
    ) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
            dataset_type,
            dates,
            partition,
        }
    }

    /// Same selection under a different storage root
    pub fn with_base_path(self, base_path: &str) -> Self {
        Self {
            base_path: normalize_base_path(base_path),
            ..self
        }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn dataset_type(&self) -> Option<DatasetType> {
        self.dataset_type
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn partition(&self) -> &PartitionDimension {
        &self.partition
    }
}

/// A storage prefix, relative to the base path and absolute
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionPath {
    pub relative: String,
    pub absolute: String,
}

impl PartitionPath {
    fn new(base_path: &str, relative: String) -> Self {
        let absolute = if relative.is_empty() {
            base_path.to_string()
        } else {
            format!("{base_path}{relative}/")
        };
        Self { relative, absolute }
    }
}

/// Derive the ordered list of partition paths for a spec
pub fn build_paths(spec: &PathSpec) -> Vec<PartitionPath> {
    let base = spec.base_path.as_str();

    let Some(dataset_type) = spec.dataset_type else {
        if !spec.dates.is_empty() || !spec.partition.is_none() {
            tracing::debug!("No dataset type given; ignoring dates and partition");
        }
        return vec![PartitionPath::new(base, String::new())];
    };

    let type_segment = format!("type={dataset_type}");
    if spec.dates.is_empty() {
        if !spec.partition.is_none() {
            tracing::debug!("No dates given; ignoring partition");
        }
        return vec![PartitionPath::new(base, type_segment)];
    }

    let partition = spec.partition.segment();
    spec.dates
        .iter()
        .map(|date| {
            let relative = match &partition {
                Some(segment) => format!("{type_segment}/date={date}/{segment}"),
                None => format!("{type_segment}/date={date}"),
            };
            PartitionPath::new(base, relative)
        })
        .collect()
}

/// Ensure a base path ends with exactly one `/`
pub fn normalize_base_path(base_path: &str) -> String {
    format!("{}/", base_path.trim_end_matches('/'))
}

/// Base path for an account in a bucket
pub fn account_base_path(bucket: &str, account_id: &str) -> String {
    format!(
        "s3://{}/v1/account_id={}/",
        bucket.trim_matches('/'),
        account_id.trim_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    const BASE: &str = "s3://b/v1/account_id=1/";

    fn spec(
        dataset_type: Option<&str>,
        start: Option<&str>,
        end: Option<&str>,
        partition: PartitionDimension,
    ) -> PathSpec {
        PathSpec::new(BASE, dataset_type, start, end, partition).unwrap()
    }

    #[test]
    fn test_dataset_type_parse() {
        assert_eq!("decisions".parse::<DatasetType>().unwrap(), DatasetType::Decisions);
        assert_eq!("events".parse::<DatasetType>().unwrap(), DatasetType::Events);
        assert!(matches!(
            "Decisions".parse::<DatasetType>(),
            Err(Error::Validation(_))
        ));
        assert!(matches!("logs".parse::<DatasetType>(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_no_type_yields_base_path() {
        let paths = build_paths(&spec(
            None,
            Some("2020-07-01"),
            None,
            PartitionDimension::Experiment("1".into()),
        ));
        assert_eq!(
            paths,
            vec![PartitionPath {
                relative: String::new(),
                absolute: BASE.to_string(),
            }]
        );
    }

    #[test]
    fn test_type_without_dates() {
        let paths = build_paths(&spec(
            Some("events"),
            None,
            None,
            PartitionDimension::Event("click".into()),
        ));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].relative, "type=events");
        assert_eq!(paths[0].absolute, "s3://b/v1/account_id=1/type=events/");
    }

    #[test]
    fn test_type_and_date() {
        let paths = build_paths(&spec(
            Some("events"),
            Some("2020-07-01"),
            None,
            PartitionDimension::None,
        ));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].relative, "type=events/date=2020-07-01");
        assert_eq!(
            paths[0].absolute,
            "s3://b/v1/account_id=1/type=events/date=2020-07-01/"
        );
    }

    #[test]
    fn test_experiment_partition() {
        let paths = build_paths(&spec(
            Some("decisions"),
            Some("2020-07-01"),
            Some("2020-07-01"),
            PartitionDimension::Experiment("56789".into()),
        ));
        assert_eq!(
            paths,
            vec![PartitionPath {
                relative: "type=decisions/date=2020-07-01/experiment=56789".into(),
                absolute: "s3://b/v1/account_id=1/type=decisions/date=2020-07-01/experiment=56789/"
                    .into(),
            }]
        );
    }

    #[test]
    fn test_event_partition() {
        let paths = build_paths(&spec(
            Some("events"),
            Some("2020-07-01"),
            None,
            PartitionDimension::Event("purchase".into()),
        ));
        assert_eq!(paths[0].relative, "type=events/date=2020-07-01/event=purchase");
    }

    #[test]
    fn test_five_day_range_in_order() {
        let paths = build_paths(&spec(
            Some("decisions"),
            Some("2020-12-30"),
            Some("2021-01-03"),
            PartitionDimension::None,
        ));
        let relative: Vec<_> = paths.iter().map(|p| p.relative.as_str()).collect();
        assert_eq!(
            relative,
            vec![
                "type=decisions/date=2020-12-30",
                "type=decisions/date=2020-12-31",
                "type=decisions/date=2021-01-01",
                "type=decisions/date=2021-01-02",
                "type=decisions/date=2021-01-03",
            ]
        );
    }

    #[test]
    fn test_invalid_type_rejected() {
        let result = PathSpec::new(BASE, Some("metrics"), None, None, PartitionDimension::None);
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[test]
    fn test_invalid_range_rejected() {
        let result = PathSpec::new(
            BASE,
            Some("events"),
            Some("2020-07-02"),
            Some("2020-07-01"),
            PartitionDimension::None,
        );
        assert!(matches!(result, Err(Error::InvalidRange { .. })));
    }

    #[test]
    fn test_absolute_join_never_doubles_or_drops_slash() {
        for base in ["s3://b/v1/account_id=1", "s3://b/v1/account_id=1/", "s3://b/v1/account_id=1//"] {
            for dataset_type in [None, Some(DatasetType::Events)] {
                for dates in [vec![], vec![date(2020, 1, 1)]] {
                    let spec = PathSpec::from_parts(
                        base,
                        dataset_type,
                        dates,
                        PartitionDimension::Experiment("7".into()),
                    );
                    for path in build_paths(&spec) {
                        let after_scheme = &path.absolute["s3://".len()..];
                        assert!(!after_scheme.contains("//"), "{}", path.absolute);
                        assert!(path.absolute.ends_with('/'), "{}", path.absolute);
                        assert!(path.absolute.starts_with(spec.base_path()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let spec = spec(
            Some("decisions"),
            Some("2020-07-01"),
            Some("2020-07-03"),
            PartitionDimension::Event("x".into()),
        );
        assert_eq!(build_paths(&spec), build_paths(&spec));
    }

    #[test]
    fn test_with_base_path() {
        let spec = PathSpec::new("", Some("events"), None, None, PartitionDimension::None)
            .unwrap()
            .with_base_path("s3://other/v1/account_id=2");
        assert_eq!(spec.base_path(), "s3://other/v1/account_id=2/");
        assert_eq!(build_paths(&spec)[0].absolute, "s3://other/v1/account_id=2/type=events/");
    }

    #[test]
    fn test_partition_from_options() {
        assert_eq!(
            PartitionDimension::from_options(Some("1"), None).unwrap(),
            PartitionDimension::Experiment("1".into())
        );
        assert_eq!(
            PartitionDimension::from_options(None, Some("e")).unwrap(),
            PartitionDimension::Event("e".into())
        );
        assert!(PartitionDimension::from_options(None, None).unwrap().is_none());
        assert!(matches!(
            PartitionDimension::from_options(Some("1"), Some("e")),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_partition_value_must_be_one_segment() {
        for (experiment, event) in [
            (Some(""), None),
            (Some("  "), None),
            (None, Some("")),
            (Some("12/34"), None),
            (None, Some("a/b")),
        ] {
            assert!(
                matches!(
                    PartitionDimension::from_options(experiment, event),
                    Err(Error::Validation(_))
                ),
                "accepted experiment={experiment:?} event={event:?}"
            );
        }
    }

    #[test]
    fn test_account_base_path() {
        assert_eq!(account_base_path("b", "1"), "s3://b/v1/account_id=1/");
        assert_eq!(account_base_path("bucket/", "42"), "s3://bucket/v1/account_id=42/");
    }
}
