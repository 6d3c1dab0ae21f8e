//! Tracepoint tags emitted by the v2xsehsm and ecdsa providers.
//!
//! Each tag is a `<provider>:<event>` pair. Tags come in open/close pairs
//! (entry/exit, call/return, start/end) and every pair belongs to one
//! correlation [`Channel`].

use std::fmt;
use std::str::FromStr;

/// Traced software layer a tracepoint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Secure element API (`v2xsehsm` provider)
    Se,
    /// ECDSA verification library (`ecdsa` provider)
    Ecdsa,
}

/// Correlation channel: one open/close pair type with its own pending slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    SeApi,
    SeHsm,
    SeSystem,
    EcdsaApi,
    EcdsaHsm,
    EcdsaBackground,
}

impl Channel {
    /// All channels, in report order
    pub const ALL: [Channel; 6] = [
        Channel::SeApi,
        Channel::SeHsm,
        Channel::SeSystem,
        Channel::EcdsaApi,
        Channel::EcdsaHsm,
        Channel::EcdsaBackground,
    ];

    pub fn layer(self) -> Layer {
        match self {
            Channel::SeApi | Channel::SeHsm | Channel::SeSystem => Layer::Se,
            Channel::EcdsaApi | Channel::EcdsaHsm | Channel::EcdsaBackground => Layer::Ecdsa,
        }
    }

    /// Dense index for fixed-size per-channel storage
    pub fn index(self) -> usize {
        self as usize
    }

    /// Tracepoint that closes an interval on this channel
    pub fn close_kind(self) -> TracepointKind {
        match self {
            Channel::SeApi => TracepointKind::SeApiExit,
            Channel::SeHsm => TracepointKind::SeHsmReturn,
            Channel::SeSystem => TracepointKind::SeSystemReturn,
            Channel::EcdsaApi => TracepointKind::EcdsaApiExit,
            Channel::EcdsaHsm => TracepointKind::EcdsaHsmReturn,
            Channel::EcdsaBackground => TracepointKind::EcdsaEndBackground,
        }
    }
}

/// Whether a tracepoint opens or closes a correlated interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Open,
    Close,
}

/// Known tracepoint kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TracepointKind {
    SeApiEntry,
    SeApiExit,
    SeHsmCall,
    SeHsmReturn,
    SeSystemCall,
    SeSystemReturn,
    EcdsaApiEntry,
    EcdsaApiExit,
    EcdsaHsmCall,
    EcdsaHsmReturn,
    EcdsaStartBackground,
    EcdsaEndBackground,
}

impl TracepointKind {
    pub const ALL: [TracepointKind; 12] = [
        TracepointKind::SeApiEntry,
        TracepointKind::SeApiExit,
        TracepointKind::SeHsmCall,
        TracepointKind::SeHsmReturn,
        TracepointKind::SeSystemCall,
        TracepointKind::SeSystemReturn,
        TracepointKind::EcdsaApiEntry,
        TracepointKind::EcdsaApiExit,
        TracepointKind::EcdsaHsmCall,
        TracepointKind::EcdsaHsmReturn,
        TracepointKind::EcdsaStartBackground,
        TracepointKind::EcdsaEndBackground,
    ];

    /// Tag string as it appears in the trace
    pub fn tag(self) -> &'static str {
        match self {
            TracepointKind::SeApiEntry => "v2xsehsm:apiEntry",
            TracepointKind::SeApiExit => "v2xsehsm:apiExit",
            TracepointKind::SeHsmCall => "v2xsehsm:hsmCall",
            TracepointKind::SeHsmReturn => "v2xsehsm:hsmReturn",
            TracepointKind::SeSystemCall => "v2xsehsm:systemCall",
            TracepointKind::SeSystemReturn => "v2xsehsm:systemReturn",
            TracepointKind::EcdsaApiEntry => "ecdsa:apiEntry",
            TracepointKind::EcdsaApiExit => "ecdsa:apiExit",
            TracepointKind::EcdsaHsmCall => "ecdsa:hsmCall",
            TracepointKind::EcdsaHsmReturn => "ecdsa:hsmReturn",
            TracepointKind::EcdsaStartBackground => "ecdsa:startBackgroundProcessing",
            TracepointKind::EcdsaEndBackground => "ecdsa:endBackgroundProcessing",
        }
    }

    pub fn channel(self) -> Channel {
        match self {
            TracepointKind::SeApiEntry | TracepointKind::SeApiExit => Channel::SeApi,
            TracepointKind::SeHsmCall | TracepointKind::SeHsmReturn => Channel::SeHsm,
            TracepointKind::SeSystemCall | TracepointKind::SeSystemReturn => Channel::SeSystem,
            TracepointKind::EcdsaApiEntry | TracepointKind::EcdsaApiExit => Channel::EcdsaApi,
            TracepointKind::EcdsaHsmCall | TracepointKind::EcdsaHsmReturn => Channel::EcdsaHsm,
            TracepointKind::EcdsaStartBackground | TracepointKind::EcdsaEndBackground => {
                Channel::EcdsaBackground
            }
        }
    }

    pub fn edge(self) -> Edge {
        match self {
            TracepointKind::SeApiEntry
            | TracepointKind::SeHsmCall
            | TracepointKind::SeSystemCall
            | TracepointKind::EcdsaApiEntry
            | TracepointKind::EcdsaHsmCall
            | TracepointKind::EcdsaStartBackground => Edge::Open,
            _ => Edge::Close,
        }
    }
}

impl fmt::Display for TracepointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Returned when a token is not one of the known tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTracepoint;

impl FromStr for TracepointKind {
    type Err = UnknownTracepoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag() == s)
            .ok_or(UnknownTracepoint)
    }
}
