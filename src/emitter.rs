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

//! Serialises a finished translation into the `.ob`, `.ext` and `.ent`
//! files next to the source file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::assembler::{IC_INITIAL, Translation};
use crate::assembler::tables::AttributeKind;
use crate::errors::AssemblyError;

/// The three output paths derived from a source path: the extension after
/// the final '.' of the file name is replaced.
pub fn output_paths(source_path: &Path) -> (PathBuf, PathBuf, PathBuf) {
    (
        source_path.with_extension("ob"),
        source_path.with_extension("ext"),
        source_path.with_extension("ent"),
    )
}

/// Writes whichever output files the translation calls for. The object
/// file needs at least one code or data entry; the externals/entries pair
/// is written whenever the attributes table is non-empty.
pub fn write_output_files(source_path: &Path, translation: &Translation) -> Result<(), AssemblyError> {
    let (ob_path, ext_path, ent_path) = output_paths(source_path);

    if !translation.attributes.is_empty() {
        write_file(&ext_path, &externals_contents(translation))?;
        write_file(&ent_path, &entries_contents(translation))?;
    }
    if !translation.code.is_empty() || !translation.data.is_empty() {
        write_file(&ob_path, &object_contents(translation))?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<(), AssemblyError> {
    fs::write(path, contents).map_err(|err| {
        AssemblyError::IoError(format!("failed to write '{}': {}", path.display(), err))
    })
}

/// Renders the object file: the size header, one line per instruction
/// word, then the data image packed four bytes per line.
pub fn object_contents(translation: &Translation) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        translation.icf - IC_INITIAL,
        translation.dcf
    ));

    for entry in translation.code.iter() {
        let [b0, b1, b2, b3] = entry.word.to_le_bytes();
        out.push_str(&format!(
            "{:04} {:02X} {:02X} {:02X} {:02X}\n",
            entry.address, b0, b1, b2, b3
        ));
    }

    let data_bytes: Vec<u8> = translation
        .data
        .iter()
        .flat_map(|entry| entry.bytes.iter().copied())
        .collect();
    let mut address = translation.icf;
    for chunk in data_bytes.chunks(4) {
        out.push_str(&format!("{:04}", address));
        for byte in chunk {
            out.push_str(&format!(" {:02X}", byte));
        }
        out.push('\n');
        address += 4;
    }
    out
}

pub fn externals_contents(translation: &Translation) -> String {
    attribute_rows(translation, AttributeKind::External)
}

pub fn entries_contents(translation: &Translation) -> String {
    attribute_rows(translation, AttributeKind::Entry)
}

fn attribute_rows(translation: &Translation, kind: AttributeKind) -> String {
    let mut out = String::new();
    for row in translation.attributes.iter() {
        if row.kind == kind {
            out.push_str(&format!("{} {:04}\n", row.name, row.address));
        }
    }
    out
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::translate;

    #[test]
    fn test_output_paths_replace_final_extension() {
        let (ob, ext, ent) = output_paths(Path::new("dir/prog.v2.asm"));
        assert_eq!(ob, Path::new("dir/prog.v2.ob"));
        assert_eq!(ext, Path::new("dir/prog.v2.ext"));
        assert_eq!(ent, Path::new("dir/prog.v2.ent"));
    }

    #[test]
    fn test_object_code_only() {
        let t = translate("main: add $1, $2, $3\nstop\n").unwrap();
        assert_eq!(
            object_contents(&t),
            "8 0\n0100 40 18 22 00\n0104 00 00 00 FC\n"
        );
    }

    #[test]
    fn test_object_data_only() {
        let t = translate("x: .dw 5, -1\n.entry x\n").unwrap();
        assert_eq!(
            object_contents(&t),
            "0 8\n0100 05 00 00 00\n0104 FF FF FF FF\n"
        );
        assert_eq!(entries_contents(&t), "x 0100\n");
        assert_eq!(externals_contents(&t), "");
    }

    #[test]
    fn test_object_short_final_data_line() {
        let t = translate("str: .asciz \"Hi\"\n").unwrap();
        assert_eq!(object_contents(&t), "0 3\n0100 48 69 00\n");
    }

    #[test]
    fn test_object_mixed_width_data_crosses_lines() {
        let t = translate("stop\nv: .dh 1, -2\nw: .db 7\n").unwrap();
        // 5 data bytes starting right after the single instruction
        assert_eq!(
            object_contents(&t),
            "4 5\n0100 00 00 00 FC\n0104 01 00 FE FF\n0108 07\n"
        );
    }

    #[test]
    fn test_externals_repeat_per_use_site() {
        let t = translate(".extern foo\nla foo\ncall foo\nstop\n").unwrap();
        assert_eq!(externals_contents(&t), "foo 0100\nfoo 0104\n");
        assert_eq!(entries_contents(&t), "");
    }

    #[test]
    fn test_header_counts_match_emitted_bytes() {
        let t = translate("add $1, $2, $3\nx: .db 1, 2, 3\nstop\n").unwrap();
        let contents = object_contents(&t);
        let body_bytes: usize = contents
            .lines()
            .skip(1)
            .map(|line| line.split_whitespace().count() - 1)
            .sum();
        assert_eq!((t.icf - IC_INITIAL + t.dcf) as usize, body_bytes);
    }
}
