//! Branch Reaper Types - Core types for namespace reconciliation
//!
//! Branch Reaper watches labelled development namespaces and tears them down
//! once the source-control branch they were provisioned from disappears.
//!
//! ## Key Concepts
//!
//! - **CandidateNamespace**: A managed namespace as seen by one scan
//! - **BranchRef**: Owner/repo/branch triple parsed from a source URL
//! - **Stage**: One step of the per-namespace teardown chain
//! - **NamespaceOutcome**: How a namespace left the chain in one scan
//! - **ScanReport**: Completion record of one full scan run

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod branch;
pub mod namespace;
pub mod outcome;

// Re-export main types
pub use branch::{BranchRef, SourceUrlError};
pub use namespace::{
    AnnotationKeys, CandidateNamespace, MissingAnnotation, NamespacePhase,
    DEFAULT_ANNOTATION_PREFIX, DEFAULT_LABEL_SELECTOR, RELEASE_ANNOTATION, SOURCE_URL_ANNOTATION,
};
pub use outcome::{
    NamespaceOutcome, NamespaceTermination, ReleaseTermination, ScanReport, Stage,
};
