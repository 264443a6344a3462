/*!
 * Parse `word/document.xml` into the in-memory model.
 *
 * The reader walks the XML event stream and keeps only the elements the
 * pipeline cares about: `w:p`, `w:r`, `w:t`, `w:tbl`/`w:tr`/`w:tc`,
 * paragraph properties (`w:pStyle`, `w:jc`) and run properties (`w:b`,
 * `w:i`, `w:u`, `w:rFonts`, `w:sz`). Tabs and line breaks inside runs are
 * mapped to `\t` and `\n` so they round-trip through the writer.
 */

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::QName;

use crate::errors::ParseError;

use super::model::{Block, DocxDocument, Paragraph, Run, Table, TableCell, TableRow};

/// Find an attribute by its local name, ignoring the namespace prefix.
fn attr_local(e: &BytesStart, local: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == local {
            if let Ok(v) = attr.unescape_value() {
                return Some(v.into_owned());
            }
        }
    }
    None
}

/// Interpret an OOXML on/off attribute (`w:val` absent means "on").
fn on_off(e: &BytesStart) -> bool {
    match attr_local(e, b"val") {
        None => true,
        Some(v) => !matches!(v.as_str(), "0" | "false" | "none" | "off"),
    }
}

#[derive(Default)]
struct ParseState {
    blocks: Vec<Block>,

    paragraph: Option<Paragraph>,
    run: Option<Run>,
    in_run_props: bool,
    in_text: bool,

    // Table nesting depth; only depth-1 tables are modeled
    table_depth: usize,
    table: Option<Table>,
    row: Option<TableRow>,
    cell: Option<TableCell>,
}

impl ParseState {
    fn finish_paragraph(&mut self) {
        if let Some(para) = self.paragraph.take() {
            if let Some(cell) = self.cell.as_mut() {
                cell.paragraphs.push(para);
            } else if self.table_depth == 0 {
                self.blocks.push(Block::Paragraph(para));
            }
        }
    }

    fn push_run_text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
        }
    }

    fn handle_start(&mut self, e: &BytesStart) {
        match e.name().local_name().as_ref() {
            b"p" => {
                self.paragraph = Some(Paragraph {
                    style_name: "Normal".to_string(),
                    ..Paragraph::default()
                });
            }
            b"r" => {
                if self.paragraph.is_some() {
                    self.run = Some(Run::default());
                }
            }
            b"rPr" => self.in_run_props = true,
            b"t" => {
                if self.run.is_some() {
                    self.in_text = true;
                }
            }
            b"tab" => self.push_run_text("\t"),
            b"br" | b"cr" => self.push_run_text("\n"),
            b"pStyle" => {
                if let (Some(para), Some(style)) = (self.paragraph.as_mut(), attr_local(e, b"val")) {
                    para.style_name = style;
                }
            }
            b"jc" => {
                if let (Some(para), Some(align)) = (self.paragraph.as_mut(), attr_local(e, b"val")) {
                    para.alignment = Some(align);
                }
            }
            b"b" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.props.bold = on_off(e);
                }
            }
            b"i" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.props.italic = on_off(e);
                }
            }
            b"u" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    run.props.underline = on_off(e);
                }
            }
            b"rFonts" if self.in_run_props => {
                if let (Some(run), Some(font)) = (self.run.as_mut(), attr_local(e, b"ascii")) {
                    run.props.font_name = Some(font);
                }
            }
            b"sz" if self.in_run_props => {
                if let Some(run) = self.run.as_mut() {
                    // w:sz is in half-points
                    if let Some(half) = attr_local(e, b"val").and_then(|v| v.parse::<f32>().ok()) {
                        run.props.font_size = Some(half / 2.0);
                    }
                }
            }
            b"tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table = Some(Table::default());
                }
            }
            b"tr" => {
                if self.table_depth == 1 {
                    self.row = Some(TableRow::default());
                }
            }
            b"tc" => {
                if self.table_depth == 1 {
                    self.cell = Some(TableCell::default());
                }
            }
            _ => {}
        }
    }

    fn handle_end(&mut self, local: &[u8]) {
        match local {
            b"p" => self.finish_paragraph(),
            b"r" => {
                if let (Some(para), Some(run)) = (self.paragraph.as_mut(), self.run.take()) {
                    para.runs.push(run);
                }
            }
            b"rPr" => self.in_run_props = false,
            b"t" => self.in_text = false,
            b"tc" => {
                if self.table_depth == 1 {
                    if let (Some(row), Some(cell)) = (self.row.as_mut(), self.cell.take()) {
                        row.cells.push(cell);
                    }
                }
            }
            b"tr" => {
                if self.table_depth == 1 {
                    if let (Some(table), Some(row)) = (self.table.as_mut(), self.row.take()) {
                        table.rows.push(row);
                    }
                }
            }
            b"tbl" => {
                if self.table_depth == 1 {
                    if let Some(table) = self.table.take() {
                        self.blocks.push(Block::Table(table));
                    }
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }
}

/// Parse the bytes of `word/document.xml` into a [`DocxDocument`].
pub fn parse_document_xml(xml: &[u8]) -> Result<DocxDocument, ParseError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut state = ParseState::default();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                // Embedded graphics can carry their own paragraphs (alt
                // text, textbox content); none of that belongs to the
                // surrounding run, so the whole subtree is skipped.
                if matches!(
                    e.name().local_name().as_ref(),
                    b"drawing" | b"pict" | b"object"
                ) {
                    let name = e.name().as_ref().to_vec();
                    skip_buf.clear();
                    reader
                        .read_to_end_into(QName(&name), &mut skip_buf)
                        .map_err(|e| ParseError::Xml(e.to_string()))?;
                } else {
                    state.handle_start(e);
                }
            }
            Ok(Event::Empty(ref e)) => {
                // Self-closing elements carry properties but no children
                state.handle_start(e);
                let name = e.name();
                match name.local_name().as_ref() {
                    b"p" => state.handle_end(b"p"),
                    b"r" => state.handle_end(b"r"),
                    b"t" => state.in_text = false,
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                state.handle_end(name.local_name().as_ref());
            }
            Ok(Event::Text(t)) => {
                if state.in_text {
                    let text = t
                        .unescape()
                        .map_err(|e| ParseError::Xml(e.to_string()))?
                        .into_owned();
                    state.push_run_text(&text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ParseError::Xml(e.to_string())),
        }
        buf.clear();
    }

    Ok(DocxDocument { blocks: state.blocks })
}
