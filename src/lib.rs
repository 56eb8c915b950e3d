/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

pub mod assembler;
pub mod emitter;
pub mod errors;
pub mod file_reader;
pub mod reserved;
pub mod scanner;

use std::path::Path;

use anyhow::{Context, Result};
use file_reader::FileReader;

/// Assembles one source file end to end. Line-level diagnostics go to
/// standard error and suppress output file creation; the return value says
/// whether the unit produced its outputs. Only failures to reach or write
/// the files themselves surface as `Err`.
pub fn assemble<F: FileReader>(source_path: &Path, reader: &F) -> Result<bool> {
    let source = reader.read_to_string(source_path)?;

    match assembler::translate(&source) {
        Ok(translation) => {
            emitter::write_output_files(source_path, &translation)
                .context("Failed while writing output files")?;
            Ok(true)
        }
        Err(line_errors) => {
            for diagnostic in &line_errors {
                eprintln!(
                    "Error! file '{}' line {}: {}.",
                    source_path.display(),
                    diagnostic.line,
                    diagnostic.error
                );
            }
            Ok(false)
        }
    }
}
