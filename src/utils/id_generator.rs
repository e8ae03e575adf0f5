// src/utils/id_generator.rs
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdType {
    Manufacturer,
    Driver,
    Car,
}

impl IdType {
    pub fn to_prefix(&self) -> &'static str {
        match self {
            IdType::Manufacturer => "mfr",
            IdType::Driver => "drv",
            IdType::Car => "car",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "mfr" => Some(IdType::Manufacturer),
            "drv" => Some(IdType::Driver),
            "car" => Some(IdType::Car),
            _ => None,
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_prefix())
    }
}

pub struct IdGenerator;

impl IdGenerator {
    /// Generate a unique ID with format: {prefix}-{yymmdd}-{random_suffix}
    /// Where random_suffix is 5 characters: 3 hexchars + 2 alphanumeric or 3 alphanumeric + 2 hexchars
    pub fn generate(id_type: IdType) -> String {
        Self::generate_with_timestamp(id_type, Utc::now())
    }

    /// Generate ID with a specific timestamp (useful for testing)
    pub fn generate_with_timestamp(id_type: IdType, timestamp: DateTime<Utc>) -> String {
        let date_part = timestamp.format("%y%m%d").to_string();
        let random_suffix = Self::generate_random_suffix();

        format!("{}-{}-{}", id_type.to_prefix(), date_part, random_suffix)
    }

    fn generate_random_suffix() -> String {
        if rand::random::<bool>() {
            format!(
                "{}{}",
                Self::generate_hex_chars(3),
                Self::generate_alphanumeric_chars(2)
            )
        } else {
            format!(
                "{}{}",
                Self::generate_alphanumeric_chars(3),
                Self::generate_hex_chars(2)
            )
        }
    }

    fn generate_hex_chars(n: usize) -> String {
        const HEX_CHARS: &[u8] = b"0123456789abcdef";
        Self::generate_from_chars(HEX_CHARS, n)
    }

    fn generate_alphanumeric_chars(n: usize) -> String {
        const ALPHANUMERIC_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
        Self::generate_from_chars(ALPHANUMERIC_CHARS, n)
    }

    fn generate_from_chars(charset: &[u8], n: usize) -> String {
        let mut rng = rand::rng();
        (0..n)
            .map(|_| charset[rng.random_range(0..charset.len())] as char)
            .collect()
    }

    /// Parse an ID to extract its components
    pub fn parse_id(id: &str) -> Result<ParsedId, IdError> {
        let parts: Vec<&str> = id.split('-').collect();
        if parts.len() != 3 {
            return Err(IdError::InvalidFormat);
        }

        let (prefix, date_part, random_suffix) = (parts[0], parts[1], parts[2]);

        if date_part.len() != 6 || random_suffix.len() != 5 || !random_suffix.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(IdError::InvalidFormat);
        }

        let id_type = IdType::from_prefix(prefix).ok_or_else(|| IdError::UnknownType(prefix.to_string()))?;

        if !date_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(IdError::InvalidDate);
        }
        let year = 2000 + date_part[0..2].parse::<i32>().map_err(|_| IdError::InvalidDate)?;
        let month = date_part[2..4].parse::<u32>().map_err(|_| IdError::InvalidDate)?;
        let day = date_part[4..6].parse::<u32>().map_err(|_| IdError::InvalidDate)?;

        if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
            return Err(IdError::InvalidDate);
        }

        Ok(ParsedId {
            id_type,
            year,
            month,
            day,
            random_suffix: random_suffix.to_string(),
        })
    }

    /// Validate if an ID matches the expected format and type
    pub fn validate_id(id: &str, expected_type: Option<IdType>) -> bool {
        match Self::parse_id(id) {
            Ok(parsed) => expected_type.is_none_or(|expected| parsed.id_type == expected),
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedId {
    pub id_type: IdType,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub random_suffix: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdError {
    #[error("Invalid ID format")]
    InvalidFormat,

    #[error("Unknown ID type: {0}")]
    UnknownType(String),

    #[error("Invalid date component in ID")]
    InvalidDate,
}

pub trait WithGeneratedId {
    fn set_generated_id(&mut self, id_type: IdType);

    fn with_generated_id(mut self, id_type: IdType) -> Self
    where
        Self: Sized,
    {
        self.set_generated_id(id_type);
        self
    }
}

impl WithGeneratedId for crate::models::manufacturer::Manufacturer {
    fn set_generated_id(&mut self, id_type: IdType) {
        self.id = IdGenerator::generate(id_type);
    }
}

impl WithGeneratedId for crate::models::driver::Driver {
    fn set_generated_id(&mut self, id_type: IdType) {
        self.id = IdGenerator::generate(id_type);
    }
}

impl WithGeneratedId for crate::models::car::Car {
    fn set_generated_id(&mut self, id_type: IdType) {
        self.id = IdGenerator::generate(id_type);
    }
}
