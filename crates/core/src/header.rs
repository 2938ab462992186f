// DATA step header: banner, DATA statement, ATTRIB blocks, INFILE/INPUT, DATALINES4

use std::fmt::Write;

use crate::model::{ColumnDescriptor, DatasetOptions, StorageType, TableRef};

/// Header text plus the per-column storage types the row encoder must use.
/// `types[i]` decides how field `i` of every row is quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub text: String,
    pub types: Vec<StorageType>,
}

pub fn banner(table: &TableRef) -> String {
    format!("/* DATA step program generated from {table} */")
}

pub fn build_header(
    table: &TableRef,
    output_name: &str,
    columns: &[ColumnDescriptor],
    options: &DatasetOptions,
) -> Header {
    let mut text = String::new();
    let mut input = String::from("INPUT \n");
    let mut types = Vec::with_capacity(columns.len());

    text.push_str(&banner(table));
    text.push('\n');
    let _ = writeln!(text, "DATA {}{};", output_name, options.render());

    for col in columns {
        text.push_str(&attrib_block(col));
        let _ = writeln!(input, "\t{}", col.name);
        types.push(col.storage_type);
    }
    input.push_str("\t;\n");

    text.push_str("INFILE DATALINES DSD;\n");
    text.push_str(&input);
    text.push_str("DATALINES4;\n");

    Header { text, types }
}

fn attrib_block(col: &ColumnDescriptor) -> String {
    let mut block = format!(
        "\tattrib {} \n\t\tlength={}{}",
        col.name,
        if col.storage_type.is_character() { "$" } else { "" },
        col.length,
    );
    if let Some(format) = &col.format {
        let _ = write!(block, "\n\t\tformat={} ", format);
    }
    if let Some(informat) = &col.informat {
        let _ = write!(block, "\n\t\tinformat={} ", informat);
    }
    if let Some(label) = &col.label {
        let _ = write!(block, "\n\t\tlabel='{}' ", quote_label(label));
    }
    block.push_str(";\n");
    block
}

/// Column labels sit in single quotes inside the ATTRIB statement.
fn quote_label(label: &str) -> String {
    label.replace('\'', "''").replace(['\n', '\r'], " ")
}
