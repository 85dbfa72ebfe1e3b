use std::path::PathBuf;

use clap::{Args, Subcommand};

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run the verification pipeline on a study document.
    Verify(VerifyArgs),
    /// Verify a study document, upload its images and write its metadata.
    Publish(PublishArgs),
    /// Fetch one published study.
    Get { id: String },
    /// List every published study.
    List,
    /// Delete a study's images and metadata.
    Delete { id: String },
    /// Make a study available to participants.
    Enable { id: String },
    /// Hide a study from participants.
    Disable { id: String },
    /// Download the recorded sessions of a study.
    Results { id: String },
}

#[derive(Clone, Debug, Args)]
pub struct VerifyArgs {
    /// Path to the study JSON document.
    pub file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct PublishArgs {
    /// Path to the study JSON document.
    pub file: PathBuf,

    /// Directory holding the image files the document references.
    ///
    /// Without it, image fields must already be paths in the remote store.
    #[arg(long)]
    pub assets: Option<PathBuf>,
}
