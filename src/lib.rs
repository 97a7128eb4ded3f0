//! # docnorm
//!
//! Rule-based structural normalization for word-processing documents,
//! tuned for the Chinese official-document formatting standard.
//!
//! The engine walks an in-memory document model and enforces typographic
//! and layout rules: full/half-width punctuation canonicalization,
//! heading role classification with mandated fonts, margins and line
//! spacing, list-marker unification, table geometry, and direct-format
//! cleanup. Every rule can diagnose without touching the document or fix
//! in place, and fixing is idempotent.
//!
//! ## Quick start
//!
//! ```
//! use docnorm::model::{Document, Margins, PageGeometry, Paragraph, Section, Style};
//! use docnorm::{normalize, EngineConfig};
//!
//! let mut section = Section::new(PageGeometry::a4(Margins::default()));
//! section.add_paragraph(Paragraph::with_text(Style::default(), "（测试),"));
//! let mut document = Document::new();
//! document.add_section(section);
//!
//! let outcome = normalize(document, &EngineConfig::default()).unwrap();
//! assert_eq!(outcome.document.plain_text().trim(), "（测试），");
//! ```
//!
//! ## Diagnosis without modification
//!
//! ```
//! use docnorm::model::Document;
//! use docnorm::{diagnose, EngineConfig};
//!
//! let issues = diagnose(&Document::new(), &EngineConfig::default()).unwrap();
//! assert!(issues.is_empty());
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod rules;

pub use config::{EngineConfig, FontRegistry, FontSpec, RoleTable, TableConfig};
pub use engine::{run, Mode, Outcome};
pub use error::{Error, Result};
pub use model::{Document, Issue, IssueKind, Location, Severity};

/// Run every rule over the document, fixing in place.
pub fn normalize(document: Document, config: &EngineConfig) -> Result<Outcome> {
    engine::run(document, Mode::SmartOneClick, config)
}

/// Report everything the rules would fix, leaving the document untouched.
pub fn diagnose(document: &Document, config: &EngineConfig) -> Result<Vec<Issue>> {
    let outcome = engine::run(document.clone(), Mode::DiagnosisOnly, config)?;
    Ok(outcome.issues)
}

/// Fix punctuation only, leaving layout, fonts, and tables alone.
pub fn fix_punctuation(document: Document, config: &EngineConfig) -> Result<Outcome> {
    engine::run(document, Mode::PunctuationFix, config)
}
