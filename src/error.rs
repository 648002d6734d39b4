//! Failures of the YAML frontend.
//!
//! Only text the scanner cannot read, or text that goes over the configured
//! [`Budget`](crate::Budget), fails a parse. Everything the adapter finds
//! wrong with a readable document ends up as node warnings instead.

use std::fmt;

use saphyr_parser::ScanError;

use crate::budget::BudgetBreach;
pub use crate::location::Location;

#[derive(Debug)]
pub enum Error {
    /// Scanner error or malformed event stream.
    Message { msg: String, location: Location },
    /// A collection or document end event without its start.
    ContainerEndMismatch { location: Location },
    /// The input went over a [`Budget`](crate::Budget) limit.
    Budget {
        breach: BudgetBreach,
        location: Location,
    },
}

impl Error {
    pub(crate) fn msg(msg: impl Into<String>) -> Self {
        Error::Message {
            msg: msg.into(),
            location: Location::UNKNOWN,
        }
    }

    fn location_mut(&mut self) -> &mut Location {
        match self {
            Error::Message { location, .. }
            | Error::ContainerEndMismatch { location }
            | Error::Budget { location, .. } => location,
        }
    }

    pub(crate) fn with_location(mut self, location: Location) -> Self {
        *self.location_mut() = location;
        self
    }

    /// Where in the input the error was found, when known.
    pub fn location(&self) -> Option<Location> {
        let (Error::Message { location, .. }
        | Error::ContainerEndMismatch { location }
        | Error::Budget { location, .. }) = self;
        location.is_known().then_some(*location)
    }

    pub(crate) fn from_scan_error(err: ScanError) -> Self {
        let marker = err.marker();
        Error::msg(err.info()).with_location(Location::new(marker.line(), marker.col() + 1))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Message { msg, .. } => f.write_str(msg)?,
            Error::ContainerEndMismatch { .. } => f.write_str("end of a list or mapping that was never started")?,
            Error::Budget { breach, .. } => write!(f, "YAML budget breached: {breach}")?,
        }
        match self.location() {
            Some(location) => write!(f, " at {location}"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for Error {}

pub(crate) fn budget_error(breach: BudgetBreach) -> Error {
    Error::Budget {
        breach,
        location: Location::UNKNOWN,
    }
}
