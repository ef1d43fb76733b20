//! The closed set of Conventional Commits types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::i18n::Language;

/// Conventional commit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
}

impl CommitType {
    /// Every type, in the order they are offered to the user and the model.
    pub const ALL: [CommitType; 10] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Perf,
        CommitType::Test,
        CommitType::Build,
        CommitType::Ci,
        CommitType::Chore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
        }
    }

    /// One-line description shown in menus and embedded in prompts.
    pub fn description(&self, lang: Language) -> &'static str {
        match (self, lang) {
            (CommitType::Feat, Language::En) => "A new feature",
            (CommitType::Feat, Language::Es) => "Una nueva característica",
            (CommitType::Fix, Language::En) => "A bug fix",
            (CommitType::Fix, Language::Es) => "Un parche para un error",
            (CommitType::Docs, Language::En) => "Documentation only changes",
            (CommitType::Docs, Language::Es) => "Cambios solo en la documentación",
            (CommitType::Style, Language::En) => {
                "Changes that do not affect the meaning of the code"
            }
            (CommitType::Style, Language::Es) => {
                "Cambios de estilo que no afectan el significado del código"
            }
            (CommitType::Refactor, Language::En) => {
                "A code change that neither fixes a bug nor adds a feature"
            }
            (CommitType::Refactor, Language::Es) => {
                "Refactorizar código sin corregir errores ni agregar características"
            }
            (CommitType::Perf, Language::En) => "A code change that improves performance",
            (CommitType::Perf, Language::Es) => "Un cambio de código que mejora el rendimiento",
            (CommitType::Test, Language::En) => "Adding missing tests or correcting existing tests",
            (CommitType::Test, Language::Es) => "Todo lo relacionado con pruebas",
            (CommitType::Build, Language::En) => {
                "Changes that affect the build system or external dependencies"
            }
            (CommitType::Build, Language::Es) => {
                "Cambios que afectan el sistema de compilación o dependencias externas"
            }
            (CommitType::Ci, Language::En) => "Changes to CI configuration files and scripts",
            (CommitType::Ci, Language::Es) => "Cambios en los archivos y scripts de configuración de CI",
            (CommitType::Chore, Language::En) => "Other changes that don't modify src or test files",
            (CommitType::Chore, Language::Es) => "Mantenimiento de código regular",
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "feat" => Ok(Self::Feat),
            "fix" => Ok(Self::Fix),
            "docs" => Ok(Self::Docs),
            "style" => Ok(Self::Style),
            "refactor" => Ok(Self::Refactor),
            "perf" => Ok(Self::Perf),
            "test" => Ok(Self::Test),
            "build" => Ok(Self::Build),
            "ci" => Ok(Self::Ci),
            "chore" => Ok(Self::Chore),
            _ => Err(format!("Unknown commit type: {}", s)),
        }
    }
}

/// The type slot of a message header.
///
/// Unlisted types are kept verbatim so validation can flag them instead of
/// losing what the user or the model wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeToken {
    Known(CommitType),
    Other(String),
}

impl TypeToken {
    pub fn parse(token: &str) -> Self {
        match token.parse::<CommitType>() {
            Ok(t) => TypeToken::Known(t),
            Err(_) => TypeToken::Other(token.to_string()),
        }
    }

    pub fn known(&self) -> Option<CommitType> {
        match self {
            TypeToken::Known(t) => Some(*t),
            TypeToken::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TypeToken::Known(t) => t.as_str(),
            TypeToken::Other(s) => s,
        }
    }
}

impl From<CommitType> for TypeToken {
    fn from(t: CommitType) -> Self {
        TypeToken::Known(t)
    }
}

impl fmt::Display for TypeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
