//! # folder-icon
//!
//! Give a Windows folder (and optionally all of its subfolders) a custom icon, and
//! take it away again.
//!
//! Installing a folder icon means three things:
//!
//! 1. Place the icon in the folder as `folder.ico`. A `.ico` source is copied.
//!    PNG/JPEG sources are converted first, with ImageMagick or the builtin encoder.
//! 2. Write a `desktop.ini` that points at it:
//!    ```text
//!    [.ShellClassInfo]
//!    IconResource=<path>,0
//!    InfoTip=Custom folder icon
//!    ```
//! 3. Mark `desktop.ini` hidden + system and the folder read-only, so Explorer honours it.
//!
//! Uninstalling deletes `desktop.ini` and clears the read-only flag; `folder.ico` stays.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use folder_icon::config::Config;
//! use folder_icon::pipeline::Pipeline;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let pipeline = Pipeline::builder().from_config(&config).build();
//!
//!     // Explicit image, applied to the folder and all subfolders
//!     let report = pipeline.install(
//!         Path::new(r"C:\Music"),
//!         Some(Path::new(r"C:\Pictures\note.png")),
//!         true,
//!     )?;
//!     println!("Customized {} folder(s)", report.folders.len());
//!
//!     pipeline.uninstall(Path::new(r"C:\Music"), true)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Testing without a disk
//!
//! Every side effect goes through [`fs::FileSystem`] and [`convert::IconConverter`].
//! [`fs::MemoryFs`] is an in-memory tree that also tracks attributes:
//!
//! ```rust
//! use folder_icon::fs::MemoryFs;
//! use folder_icon::convert::BuiltinConverter;
//! use folder_icon::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let fs = MemoryFs::new();
//! fs.add_file("/photos/folder.ico", b"icon".to_vec());
//!
//! let pipeline = Pipeline::builder()
//!     .file_system(fs.clone())
//!     .converter(BuiltinConverter)
//!     .build();
//! pipeline.install(Path::new("/photos"), None, false).unwrap();
//!
//! assert!(fs.attributes("/photos/desktop.ini").unwrap().hidden);
//! assert!(fs.attributes("/photos").unwrap().read_only);
//! ```
//!
//! ## Modules
//!
//! - [`api`] — string-in, [`api::Response`]-out surface for the GUI
//! - [`config`] — configuration types and loading/saving
//! - [`convert`] — image → `.ico` conversion (ImageMagick or builtin)
//! - [`customize`] — writing/removing `desktop.ini` and attributes
//! - [`desktop_ini`] — the `desktop.ini` format
//! - [`error`] — [`error::IconError`] and its kinds
//! - [`fs`] — filesystem abstraction, real and in-memory
//! - [`pipeline`] — path resolution, install/uninstall/status and the recursive walk
//! - [`resolve`] — folder/image path resolution and default image lookup

pub mod api;
pub mod config;
pub mod convert;
pub mod customize;
pub mod desktop_ini;
pub mod error;
pub mod fs;
pub mod pipeline;
pub mod resolve;
