// Data normalization: arbitrary input -> ordered list of named buckets

use crate::value::Value;
use indexmap::{IndexMap, IndexSet};

/// One normalized unit of input data
#[derive(Debug, Clone, PartialEq)]
pub struct DataBucket {
    pub name: Option<String>,
    pub data: Value,
    /// Every other key of a bucket given as a mapping, in input order
    pub extra: IndexMap<String, Value>,
}

impl DataBucket {
    pub fn new(data: Value) -> Self {
        DataBucket {
            name: None,
            data,
            extra: IndexMap::new(),
        }
    }

    pub fn named(name: impl Into<String>, data: Value) -> Self {
        DataBucket {
            name: Some(name.into()),
            ..DataBucket::new(data)
        }
    }

    /// Value addressed by `key` inside list or map data
    pub fn value_at(&self, key: &ValueKey) -> Option<&Value> {
        match (&self.data, key) {
            (Value::List(items), ValueKey::Index(i)) => items.get(*i),
            (Value::Map(map), ValueKey::Name(name)) => map.get(name.as_str()),
            (Value::Map(map), ValueKey::Index(i)) => map.get_index(*i).map(|(_, v)| v),
            _ => None,
        }
    }
}

/// Address of a sub-value inside a bucket's data
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ValueKey {
    fn from(i: usize) -> Self {
        ValueKey::Index(i)
    }
}

impl From<&str> for ValueKey {
    fn from(name: &str) -> Self {
        ValueKey::Name(name.to_string())
    }
}

/// Max/min over every numeric leaf of a series
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub max: Option<f64>,
    pub min: Option<f64>,
}

impl Range {
    fn include(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if self.max.map_or(true, |max| value > max) {
            self.max = Some(value);
        }
        if self.min.map_or(true, |min| value < min) {
            self.min = Some(value);
        }
    }
}

/// Immutable, ordered collection of data buckets
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataSeries {
    buckets: Vec<DataBucket>,
}

impl DataSeries {
    /// Normalize any input shape into buckets. Never fails.
    ///
    /// - list input: one bucket per element; maps carrying a `data` key are
    ///   taken as buckets verbatim, everything else becomes `{data: element}`
    /// - map input: one `{name: key, data: value}` bucket per entry
    /// - scalar input: a single bucket
    pub fn normalize(input: Value) -> Self {
        let buckets = match input {
            Value::List(items) => items.into_iter().map(bucket_from_element).collect(),
            Value::Map(map) => map
                .into_iter()
                .map(|(name, data)| DataBucket::named(name, data))
                .collect(),
            scalar => vec![DataBucket::new(scalar)],
        };

        let series = DataSeries { buckets };
        tracing::debug!(buckets = series.len(), "normalized data series");
        series
    }

    pub fn from_buckets(buckets: Vec<DataBucket>) -> Self {
        DataSeries { buckets }
    }

    pub fn buckets(&self) -> &[DataBucket] {
        &self.buckets
    }

    pub fn get(&self, index: usize) -> Option<&DataBucket> {
        self.buckets.get(index)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Max and min over all numeric leaves.
    ///
    /// Each list is reduced on its own, map values are scanned one by one and
    /// scalars count as themselves. Text and nested containers are skipped.
    pub fn range(&self) -> Range {
        let mut range = Range::default();

        for bucket in &self.buckets {
            match &bucket.data {
                Value::List(items) => {
                    let numbers = items.iter().filter_map(Value::as_number);
                    let local_max = numbers.clone().fold(None, |acc: Option<f64>, n| {
                        Some(acc.map_or(n, |a| a.max(n)))
                    });
                    let local_min = numbers.fold(None, |acc: Option<f64>, n| {
                        Some(acc.map_or(n, |a| a.min(n)))
                    });
                    if let Some(max) = local_max {
                        range.include(max);
                    }
                    if let Some(min) = local_min {
                        range.include(min);
                    }
                }
                Value::Map(map) => {
                    for n in map.values().filter_map(Value::as_number) {
                        range.include(n);
                    }
                }
                scalar => {
                    if let Some(n) = scalar.as_number() {
                        range.include(n);
                    }
                }
            }
        }

        range
    }

    /// Category labels for an x axis or legend.
    ///
    /// A named numeric bucket contributes its name and any other scalar an
    /// empty string. As soon as one bucket holds a map, the labels become the
    /// union of all map keys in first-seen order, dropping whatever the other
    /// buckets contributed. As soon as one bucket holds a list, every label
    /// becomes blank, one per element of the longest list, overriding both
    /// previous rules.
    pub fn labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        let mut keys: IndexSet<&str> = IndexSet::new();
        let mut saw_map = false;
        let mut longest_list: Option<usize> = None;

        for bucket in &self.buckets {
            match (&bucket.name, &bucket.data) {
                (Some(name), Value::Number(_)) if !name.is_empty() => labels.push(name.clone()),
                (_, Value::List(items)) => {
                    longest_list = Some(longest_list.unwrap_or(0).max(items.len()));
                }
                (_, Value::Map(map)) => {
                    saw_map = true;
                    keys.extend(map.keys().map(String::as_str));
                }
                _ => labels.push(String::new()),
            }
        }

        if saw_map {
            labels = keys.into_iter().map(str::to_string).collect();
        }
        if let Some(len) = longest_list {
            labels = vec![String::new(); len];
        }

        labels
    }
}

fn bucket_from_element(element: Value) -> DataBucket {
    match element {
        Value::Map(mut map) if map.contains_key("data") => {
            let data = map.shift_remove("data").unwrap_or(Value::Text(String::new()));
            // a name that is not a scalar stays with the other keys
            let name = match map.get("name") {
                Some(Value::Text(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            if name.is_some() {
                map.shift_remove("name");
            }
            DataBucket { name, data, extra: map }
        }
        other => DataBucket::new(other),
    }
}
