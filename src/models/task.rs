use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder batch for records without one
pub const DEFAULT_BATCH: &str = "未指定梯次";

/// Placeholder purpose for (environment, batch) pairs without one
pub const DEFAULT_PURPOSE: &str = "未指定目的";

/// Value of a field the record source did not recognise
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Date(NaiveDate),
    Empty,
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Date(_) => false,
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            FieldValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub name: String,
    pub value: FieldValue,
}

/// Ordered field name -> value mapping.
///
/// Insertion order is the column order of the source sheet; setting an
/// existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomFields(Vec<CustomField>);

impl CustomFields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.0.iter_mut().find(|field| field.name == name) {
            Some(field) => field.value = value,
            None => self.0.push(CustomField { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|field| field.name == name).map(|field| &field.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomField> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One schedule record as handed over by the record source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTask {
    pub environment: String,
    pub purpose: Option<String>,
    /// Work item text
    pub content: Option<String>,
    pub batch: Option<String>,
    pub status: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub business_date: Option<NaiveDate>,
    pub data_base_date: Option<NaiveDate>,
    pub freeze_date: Option<NaiveDate>,
    pub transfer_date: Option<NaiveDate>,
    pub remark: Option<String>,
    pub intermediate_file: Option<String>,
    pub custom_fields: CustomFields,
}

impl RawTask {
    /// Create a record with the identifying fields set
    pub fn new(environment: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
            status: status.into(),
            ..Self::default()
        }
    }

    pub fn with_batch(mut self, batch: impl Into<String>) -> Self {
        self.batch = Some(batch.into());
        self
    }

    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.start_date = Some(start);
        self.end_date = end;
        self
    }

    /// Batch name, with blanks replaced by the sentinel
    pub fn batch_or_default(&self) -> &str {
        match self.batch.as_deref().map(str::trim) {
            Some(batch) if !batch.is_empty() => batch,
            _ => DEFAULT_BATCH,
        }
    }

    /// Purpose text if it carries information
    pub fn meaningful_purpose(&self) -> Option<&str> {
        self.purpose
            .as_deref()
            .map(str::trim)
            .filter(|purpose| !purpose.is_empty() && *purpose != DEFAULT_PURPOSE)
    }
}
