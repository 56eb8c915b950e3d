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

//! The append-only tables that carry state between the passes. Insertion
//! order is preserved everywhere; emission order is insertion order.

use std::collections::HashMap;

use crate::assembler::encoder::InstructionWord;
use crate::errors::AssemblyError;
use crate::reserved::DirectiveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub value: i64,
    pub kind: SymbolKind,
    pub is_entry: bool,
}

// The symbol table keeps symbols in definition order and carries a name
// index on the side for lookups.
#[derive(Debug, Default, PartialEq)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.symbols[i])
    }

    /// Records a definition. Redefining a `code`/`data` symbol fails with
    /// `DuplicateLabel`; overriding an `external` one with a local kind fails
    /// with `ExternalRedefinition`; repeating an `.extern` declaration is
    /// accepted and changes nothing.
    pub fn define(
        &mut self,
        name: &str,
        value: i64,
        kind: SymbolKind,
    ) -> Result<(), AssemblyError> {
        if let Some(existing) = self.get(name) {
            return match (existing.kind, kind) {
                (SymbolKind::External, SymbolKind::External) => Ok(()),
                (SymbolKind::External, _) => {
                    Err(AssemblyError::ExternalRedefinition(name.to_string()))
                }
                _ => Err(AssemblyError::DuplicateLabel(name.to_string())),
            };
        }
        self.index.insert(name.to_string(), self.symbols.len());
        self.symbols.push(Symbol {
            name: name.to_string(),
            value,
            kind,
            is_entry: false,
        });
        Ok(())
    }

    /// Flags a defined symbol for export. An external symbol may not be an
    /// entry; its address belongs to another translation unit.
    pub fn mark_entry(&mut self, name: &str) -> Result<(), AssemblyError> {
        match self.index.get(name) {
            None => Err(AssemblyError::UnknownEntryLabel(name.to_string())),
            Some(&i) => {
                if self.symbols[i].kind == SymbolKind::External {
                    return Err(AssemblyError::ExternalRedefinition(name.to_string()));
                }
                self.symbols[i].is_entry = true;
                Ok(())
            }
        }
    }

    /// End of first pass: the data region moves above the code region.
    pub fn relocate_data(&mut self, icf: i64) {
        for symbol in &mut self.symbols {
            if symbol.kind == SymbolKind::Data {
                symbol.value += icf;
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeEntry {
    pub line_number: usize,
    pub address: i64,
    pub word: InstructionWord,
}

#[derive(Debug, Default, PartialEq)]
pub struct CodeImage {
    entries: Vec<CodeEntry>,
}

impl CodeImage {
    pub fn push(&mut self, entry: CodeEntry) {
        self.entries.push(entry);
    }

    pub fn entry_at_line_mut(&mut self, line_number: usize) -> Option<&mut CodeEntry> {
        self.entries
            .iter_mut()
            .find(|entry| entry.line_number == line_number)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CodeEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataEntry {
    pub address: i64,
    pub kind: DirectiveKind,
    pub variable_size: usize,
    pub num_of_variables: usize,
    /// The stored variables, already packed little-endian.
    pub bytes: Vec<u8>,
}

impl DataEntry {
    pub fn data_size(&self) -> usize {
        self.variable_size * self.num_of_variables
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct DataImage {
    entries: Vec<DataEntry>,
}

impl DataImage {
    pub fn push(&mut self, entry: DataEntry) {
        self.entries.push(entry);
    }

    pub fn relocate(&mut self, icf: i64) {
        for entry in &mut self.entries {
            entry.address += icf;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &DataEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.entries.iter().map(|entry| entry.bytes.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Entry,
    External,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeEntry {
    pub name: String,
    pub kind: AttributeKind,
    pub address: i64,
}

// One row per use-site of an external label, then one row per entry symbol.
#[derive(Debug, Default, PartialEq)]
pub struct AttributesTable {
    entries: Vec<AttributeEntry>,
}

impl AttributesTable {
    pub fn push(&mut self, entry: AttributeEntry) {
        self.entries.push(entry);
    }

    /// End of second pass: every symbol flagged as entry gets a row, in
    /// symbol-table order.
    pub fn record_entry_symbols(&mut self, symbols: &SymbolTable) {
        for symbol in symbols.iter() {
            if symbol.is_entry {
                self.entries.push(AttributeEntry {
                    name: symbol.name.clone(),
                    kind: AttributeKind::Entry,
                    address: symbol.value,
                });
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &AttributeEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ------------- unit tests -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_definition_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("main", 100, SymbolKind::Code).unwrap();
        assert_eq!(
            table.define("main", 104, SymbolKind::Code),
            Err(AssemblyError::DuplicateLabel("main".to_string()))
        );
        assert_eq!(
            table.define("main", 0, SymbolKind::Data),
            Err(AssemblyError::DuplicateLabel("main".to_string()))
        );
        // the failed definitions left the table untouched
        assert_eq!(table.get("main").unwrap().value, 100);
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn test_external_rules() {
        let mut table = SymbolTable::new();
        table.define("foo", 0, SymbolKind::External).unwrap();
        // a repeated .extern is fine
        assert!(table.define("foo", 0, SymbolKind::External).is_ok());
        // a local definition over an external is not
        assert_eq!(
            table.define("foo", 100, SymbolKind::Code),
            Err(AssemblyError::ExternalRedefinition("foo".to_string()))
        );
        // and neither is exporting it
        assert_eq!(
            table.mark_entry("foo"),
            Err(AssemblyError::ExternalRedefinition("foo".to_string()))
        );
    }

    #[test]
    fn test_mark_entry() {
        let mut table = SymbolTable::new();
        table.define("x", 0, SymbolKind::Data).unwrap();
        table.mark_entry("x").unwrap();
        let symbol = table.get("x").unwrap();
        assert!(symbol.is_entry);
        assert_eq!(symbol.kind, SymbolKind::Data);

        assert_eq!(
            table.mark_entry("missing"),
            Err(AssemblyError::UnknownEntryLabel("missing".to_string()))
        );
    }

    #[test]
    fn test_relocate_data_symbols() {
        let mut table = SymbolTable::new();
        table.define("main", 100, SymbolKind::Code).unwrap();
        table.define("x", 0, SymbolKind::Data).unwrap();
        table.define("ext", 0, SymbolKind::External).unwrap();
        table.relocate_data(108);
        assert_eq!(table.get("main").unwrap().value, 100);
        assert_eq!(table.get("x").unwrap().value, 108);
        assert_eq!(table.get("ext").unwrap().value, 0);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut table = SymbolTable::new();
        table.define("b", 0, SymbolKind::Data).unwrap();
        table.define("a", 4, SymbolKind::Data).unwrap();
        let names: Vec<&str> = table.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_record_entry_symbols() {
        let mut symbols = SymbolTable::new();
        symbols.define("first", 100, SymbolKind::Code).unwrap();
        symbols.define("second", 104, SymbolKind::Code).unwrap();
        symbols.mark_entry("second").unwrap();
        symbols.mark_entry("first").unwrap();

        let mut attributes = AttributesTable::default();
        attributes.record_entry_symbols(&symbols);
        let rows: Vec<(&str, i64)> = attributes
            .iter()
            .map(|row| (row.name.as_str(), row.address))
            .collect();
        // table order, not .entry order
        assert_eq!(rows, [("first", 100), ("second", 104)]);
    }

    #[test]
    fn test_data_entry_size() {
        let entry = DataEntry {
            address: 0,
            kind: DirectiveKind::Dh,
            variable_size: 2,
            num_of_variables: 3,
            bytes: vec![1, 0, 2, 0, 3, 0],
        };
        assert_eq!(entry.data_size(), 6);
        assert_eq!(entry.data_size(), entry.bytes.len());
    }
}
