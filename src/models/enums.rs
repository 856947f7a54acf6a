use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(SectionType {
    PersonalDetails => "personal_details",
    FinancialSummary => "financial_summary",
    Assets => "assets",
    Pensions => "pensions",
    Protection => "protection",
    Goals => "goals",
    Recommendations => "recommendations",
    Opportunities => "opportunities",
    Risks => "risks",
    RecentChanges => "recent_changes",
    TaxPosition => "tax_position",
    CommunicationLog => "communication_log",
    Other => "other",
});

impl SectionType {
    /// The closed vocabulary, in display order.
    pub const ALL: [SectionType; 13] = [
        SectionType::PersonalDetails,
        SectionType::FinancialSummary,
        SectionType::Assets,
        SectionType::Pensions,
        SectionType::Protection,
        SectionType::Goals,
        SectionType::Recommendations,
        SectionType::Opportunities,
        SectionType::Risks,
        SectionType::RecentChanges,
        SectionType::TaxPosition,
        SectionType::CommunicationLog,
        SectionType::Other,
    ];
}

str_enum!(ClientStatus {
    Active => "active",
    Inactive => "inactive",
});

str_enum!(ParseStatus {
    Completed => "completed",
    Failed => "failed",
});

/// Which path produced a pipeline result. Surfaced to the advisor so an
/// offline result is never mistaken for model output.
str_enum!(Provenance {
    AiGenerated => "ai_generated",
    Offline => "offline",
});
