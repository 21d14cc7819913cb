use super::ToolKind;
use crate::errors::GridError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const DEFAULT_FREQUENCY: &str = "main";
const DEFAULT_COMMIT_MESSAGE: &str = "Automated update from Agent";

/// Post-decode checks for schema enums serde's type system can't express.
/// Anything semantic is left to the backend that owns the data.
pub(super) trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

pub(super) fn decode<T>(kind: ToolKind, arguments: Value) -> Result<T, GridError>
where
    T: DeserializeOwned + Validate,
{
    let args: T = serde_json::from_value(arguments)
        .map_err(|e| GridError::invalid_arguments(kind.name(), e.to_string()))?;
    args.validate()
        .map_err(|msg| GridError::invalid_arguments(kind.name(), msg))?;
    Ok(args)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for Credentials {}

/// `as_agent` is accepted for compatibility; every hub login is an agent login.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

impl Validate for LoginArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TransferArgs {
    pub recipient: String,
    #[serde(deserialize_with = "lenient::number")]
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
}

impl Validate for TransferArgs {}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct LimitArgs {
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub limit: Option<u32>,
}

impl Validate for LimitArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostArgs {
    pub title: String,
    pub content: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

fn default_frequency() -> String {
    DEFAULT_FREQUENCY.to_string()
}

impl Validate for PostArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommentArgs {
    #[serde(deserialize_with = "lenient::int")]
    pub post_id: i64,
    pub content: String,
    #[serde(default, deserialize_with = "lenient::opt_int")]
    pub parent_id: Option<i64>,
}

impl Validate for CommentArgs {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Post,
    Comment,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResonateArgs {
    pub item_type: ItemType,
    #[serde(deserialize_with = "lenient::int")]
    pub item_id: i64,
    #[serde(deserialize_with = "lenient::int")]
    pub value: i64,
}

impl Validate for ResonateArgs {
    fn validate(&self) -> Result<(), String> {
        if !(-1..=1).contains(&self.value) {
            return Err(format!("`value` must be 1, -1 or 0, got {}", self.value));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrequencyArgs {
    pub name: String,
    pub description: String,
}

impl Validate for FrequencyArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DomainArgs {
    pub domain: String,
}

impl Validate for DomainArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeployArgs {
    pub name: String,
    pub repo: String,
    #[serde(deserialize_with = "lenient::int")]
    pub domain_id: i64,
}

impl Validate for DeployArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadEmailArgs {
    #[serde(deserialize_with = "lenient::int")]
    pub email_id: i64,
}

impl Validate for ReadEmailArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SendMailArgs {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Validate for SendMailArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchArgs {
    pub query: String,
}

impl Validate for SearchArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateRepoArgs {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub private: bool,
}

impl Validate for CreateRepoArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PushArgs {
    pub repo_name: String,
    pub files: BTreeMap<String, String>,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

fn default_commit_message() -> String {
    DEFAULT_COMMIT_MESSAGE.to_string()
}

impl Validate for PushArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebReadArgs {
    pub url: String,
}

impl Validate for WebReadArgs {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WebPostArgs {
    pub url: String,
    pub data: Map<String, Value>,
}

impl Validate for WebPostArgs {}

/// Models routinely quote numbers and booleans; accept both spellings.
mod lenient {
    use serde::Deserialize;
    use serde::de::{Deserializer, Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Int(i64),
        Float(f64),
        Text(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    fn to_int<T: TryFrom<i64>, E: Error>(raw: RawNumber) -> Result<T, E> {
        let n = match raw {
            RawNumber::Int(n) => n,
            RawNumber::Float(f) if f.fract() == 0.0 && f.is_finite() => f as i64,
            RawNumber::Float(f) => {
                return Err(E::custom(format!("expected an integer, got {f}")));
            }
            RawNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("expected an integer, got \"{s}\"")))?,
        };
        T::try_from(n).map_err(|_| E::custom(format!("integer {n} out of range")))
    }

    pub fn int<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        to_int(RawNumber::deserialize(d)?)
    }

    pub fn opt_int<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<i64>,
    {
        match Option::<RawNumber>::deserialize(d)? {
            Some(raw) => to_int(raw).map(Some),
            None => Ok(None),
        }
    }

    pub fn number<'de, D>(d: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawNumber::deserialize(d)? {
            RawNumber::Int(n) => Ok(n as f64),
            RawNumber::Float(f) => Ok(f),
            RawNumber::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| D::Error::custom(format!("expected a number, got \"{s}\""))),
        }
    }

    pub fn flag<'de, D>(d: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match RawFlag::deserialize(d)? {
            RawFlag::Bool(b) => Ok(b),
            RawFlag::Int(n) => Ok(n != 0),
            RawFlag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" | "" => Ok(false),
                _ => Err(D::Error::custom(format!("expected a boolean, got \"{s}\""))),
            },
        }
    }
}
