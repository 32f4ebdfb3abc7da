use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Concrete valuation providers shipped with valuegate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    SuperCar,
    PremiumCar,
}

impl ProviderId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperCar => "SuperCar",
            Self::PremiumCar => "PremiumCar",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
