//! Selection tokens carried by menu choices.
//!
//! Tokens are short strings so they fit transport limits (Telegram caps
//! callback data at 64 bytes). Value-carrying tokens use a prefix followed by
//! the value.

use crate::pin::PinSize;
use std::fmt;
use std::str::FromStr;

const LINE: &str = "t_ll_";
const SIZE: &str = "t_m_";
const PRODUCT: &str = "t_p_";
const MARKET: &str = "t_me_";
const PIN: &str = "pin_";
const SETUP_LINE: &str = "c_n_ll_";
const SETUP_PRODUCT: &str = "c_n_p_";
const SETUP_SIZE: &str = "c_n_m_";
const SETUP_MARKET: &str = "c_n_me_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start a transit report.
    StartReport,
    Line(String),
    Size(String),
    Product(String),
    Market(String),
    Pin(PinSize),
    AddAnother(bool),
    ShowLabel,
    MainMenu,
    SetupMenu,
    SetupNew,
    SetupView,
    SetupLine(String),
    SetupProduct(String),
    SetupSize(String),
    SetupMarket(String),
}

impl Token {
    /// Parses a token; unknown or malformed strings yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let fixed = match raw {
            "transito" => Some(Self::StartReport),
            "otro_si" => Some(Self::AddAnother(true)),
            "otro_no" => Some(Self::AddAnother(false)),
            "ver_clave" => Some(Self::ShowLabel),
            "volver_menu" => Some(Self::MainMenu),
            "carga_menu" => Some(Self::SetupMenu),
            "carga_nuevo" => Some(Self::SetupNew),
            "carga_ver" => Some(Self::SetupView),
            _ => None,
        };
        if fixed.is_some() {
            return fixed;
        }

        let value = |prefix: &str| {
            raw.strip_prefix(prefix)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        // Setup prefixes start with "c_n_" and never overlap the transit ones.
        if let Some(v) = value(SETUP_MARKET) {
            return Some(Self::SetupMarket(v));
        }
        if let Some(v) = value(SETUP_SIZE) {
            return Some(Self::SetupSize(v));
        }
        if let Some(v) = value(SETUP_PRODUCT) {
            return Some(Self::SetupProduct(v));
        }
        if let Some(v) = value(SETUP_LINE) {
            return Some(Self::SetupLine(v));
        }
        if let Some(v) = value(MARKET) {
            return Some(Self::Market(v));
        }
        if let Some(v) = value(LINE) {
            return Some(Self::Line(v));
        }
        if let Some(v) = value(SIZE) {
            return Some(Self::Size(v));
        }
        if let Some(v) = value(PRODUCT) {
            return Some(Self::Product(v));
        }
        if let Some(v) = value(PIN) {
            return PinSize::from_str(&v).ok().map(Self::Pin);
        }
        None
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartReport => f.write_str("transito"),
            Self::Line(v) => write!(f, "{LINE}{v}"),
            Self::Size(v) => write!(f, "{SIZE}{v}"),
            Self::Product(v) => write!(f, "{PRODUCT}{v}"),
            Self::Market(v) => write!(f, "{MARKET}{v}"),
            Self::Pin(pin) => write!(f, "{PIN}{pin}"),
            Self::AddAnother(true) => f.write_str("otro_si"),
            Self::AddAnother(false) => f.write_str("otro_no"),
            Self::ShowLabel => f.write_str("ver_clave"),
            Self::MainMenu => f.write_str("volver_menu"),
            Self::SetupMenu => f.write_str("carga_menu"),
            Self::SetupNew => f.write_str("carga_nuevo"),
            Self::SetupView => f.write_str("carga_ver"),
            Self::SetupLine(v) => write!(f, "{SETUP_LINE}{v}"),
            Self::SetupProduct(v) => write!(f, "{SETUP_PRODUCT}{v}"),
            Self::SetupSize(v) => write!(f, "{SETUP_SIZE}{v}"),
            Self::SetupMarket(v) => write!(f, "{SETUP_MARKET}{v}"),
        }
    }
}
