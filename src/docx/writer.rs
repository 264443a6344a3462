/*!
 * Emit `word/document.xml` from the in-memory model.
 *
 * Two emitters live here. [`rewrite_document_xml`] is the one the pipeline
 * uses: it streams the original document part through and substitutes only
 * the run text of modeled paragraphs and cells, so table properties, the
 * grid, section properties, drawings, hyperlink wrappers, numbering, and
 * anything else the model does not capture survive byte for byte.
 * [`serialize_document_xml`] regenerates a minimal document part from the
 * model alone, for callers with no source XML to rewrite against.
 *
 * Run text containing `\t` or `\n` is emitted as `w:tab` / `w:br` elements
 * so whitespace formatting survives the round trip.
 */

use std::io::Cursor;

use anyhow::Result;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};

use super::model::{Block, DocxDocument, Paragraph, Run, Table};

const WORDPROCESSING_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write_empty_with_val(writer: &mut XmlWriter, tag: &str, val: &str) -> Result<()> {
    let mut e = BytesStart::new(tag);
    e.push_attribute(("w:val", val));
    writer.write_event(Event::Empty(e))?;
    Ok(())
}

fn flush_text_segment(writer: &mut XmlWriter, segment: &mut String) -> Result<()> {
    if !segment.is_empty() {
        let mut t = BytesStart::new("w:t");
        t.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(t))?;
        writer.write_event(Event::Text(BytesText::new(segment)))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;
        segment.clear();
    }
    Ok(())
}

/// Emit run text as `w:t` segments, tabs and breaks as their own elements.
fn write_text_segments(writer: &mut XmlWriter, text: &str) -> Result<()> {
    let mut segment = String::new();
    for ch in text.chars() {
        match ch {
            '\t' => {
                flush_text_segment(writer, &mut segment)?;
                writer.write_event(Event::Empty(BytesStart::new("w:tab")))?;
            }
            '\n' => {
                flush_text_segment(writer, &mut segment)?;
                writer.write_event(Event::Empty(BytesStart::new("w:br")))?;
            }
            _ => segment.push(ch),
        }
    }
    flush_text_segment(writer, &mut segment)
}

fn write_run(writer: &mut XmlWriter, run: &Run) -> Result<()> {
    // Cleared runs vanish from the output
    if run.text.is_empty() {
        return Ok(());
    }

    writer.write_event(Event::Start(BytesStart::new("w:r")))?;

    let props = &run.props;
    let has_props = props.bold
        || props.italic
        || props.underline
        || props.font_name.is_some()
        || props.font_size.is_some();
    if has_props {
        writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
        if let Some(font) = &props.font_name {
            let mut fonts = BytesStart::new("w:rFonts");
            fonts.push_attribute(("w:ascii", font.as_str()));
            fonts.push_attribute(("w:hAnsi", font.as_str()));
            writer.write_event(Event::Empty(fonts))?;
        }
        if props.bold {
            writer.write_event(Event::Empty(BytesStart::new("w:b")))?;
        }
        if props.italic {
            writer.write_event(Event::Empty(BytesStart::new("w:i")))?;
        }
        if props.underline {
            write_empty_with_val(writer, "w:u", "single")?;
        }
        if let Some(size) = props.font_size {
            // w:sz is in half-points
            write_empty_with_val(writer, "w:sz", &format!("{}", (size * 2.0).round() as u32))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
    }

    write_text_segments(writer, &run.text)?;

    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    Ok(())
}

fn write_paragraph(writer: &mut XmlWriter, para: &Paragraph) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;

    let has_style = !para.style_name.is_empty() && para.style_name != "Normal";
    if has_style || para.alignment.is_some() {
        writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
        if has_style {
            write_empty_with_val(writer, "w:pStyle", &para.style_name)?;
        }
        if let Some(align) = &para.alignment {
            write_empty_with_val(writer, "w:jc", align)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;
    }

    for run in &para.runs {
        write_run(writer, run)?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_table(writer: &mut XmlWriter, table: &Table) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;
    for row in &table.rows {
        writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
        for cell in &row.cells {
            writer.write_event(Event::Start(BytesStart::new("w:tc")))?;
            for para in &cell.paragraphs {
                if !para.removed {
                    write_paragraph(writer, para)?;
                }
            }
            writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
    Ok(())
}

/// Serialize a [`DocxDocument`] into `word/document.xml` bytes, from the
/// model alone. Paragraphs marked removed are dropped.
pub fn serialize_document_xml(doc: &DocxDocument) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("w:document");
    root.push_attribute(("xmlns:w", WORDPROCESSING_NS));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for block in &doc.blocks {
        match block {
            Block::Paragraph(para) if para.removed => {}
            Block::Paragraph(para) => write_paragraph(&mut writer, para)?,
            Block::Table(table) => write_table(&mut writer, table)?,
        }
    }

    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    Ok(writer.into_inner().into_inner())
}

/// Locate the model paragraph for the next source `w:p`, advancing the
/// matching cursor. Mirrors the reader's enumeration: body paragraphs by
/// position, cell paragraphs by position within the current depth-1 cell,
/// paragraphs inside a table but outside any cell are unmodeled.
#[allow(clippy::too_many_arguments)]
fn next_model_paragraph<'a>(
    paragraphs: &[&'a Paragraph],
    tables: &[&'a Table],
    in_cell: bool,
    table_depth: usize,
    table: usize,
    row: usize,
    col: usize,
    body_para: &mut usize,
    cell_para: &mut usize,
) -> Option<&'a Paragraph> {
    if in_cell {
        let index = *cell_para;
        *cell_para += 1;
        tables
            .get(table)
            .and_then(|t| t.rows.get(row))
            .and_then(|r| r.cells.get(col))
            .and_then(|c| c.paragraphs.get(index))
    } else if table_depth == 0 {
        let index = *body_para;
        *body_para += 1;
        paragraphs.get(index).copied()
    } else {
        None
    }
}

/// Re-emit one `w:r` subtree with its text replaced by `text`.
///
/// Direct text children (`w:t`, `w:tab`, `w:br`, `w:cr`) are dropped and
/// the replacement emitted in their place before the closing tag; every
/// other child (run properties, drawings, embedded objects) is copied
/// through. A run left with no text and nothing besides run properties is
/// dropped entirely.
fn rewrite_run(raw: &[u8], text: Option<&str>, out: &mut Vec<u8>) -> Result<()> {
    let replacement = text.unwrap_or("");
    let mut reader = Reader::from_reader(raw);
    let mut buf = Vec::new();
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    let mut depth = 0usize;
    let mut skip_from: Option<usize> = None;
    let mut in_run_props = false;
    let mut kept_children = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                if skip_from.is_some() {
                    depth += 1;
                } else if depth == 1
                    && matches!(e.name().local_name().as_ref(), b"t" | b"tab" | b"br" | b"cr")
                {
                    skip_from = Some(depth);
                    depth += 1;
                } else {
                    if depth == 1 {
                        if e.name().local_name().as_ref() == b"rPr" {
                            in_run_props = true;
                        } else {
                            kept_children = true;
                        }
                    }
                    writer.write_event(Event::Start(e.to_owned()))?;
                    depth += 1;
                }
            }
            Event::Empty(ref e) => {
                if skip_from.is_some() {
                } else if depth == 0 {
                    // `<w:r/>` with no children at all
                    if !replacement.is_empty() {
                        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                        writer.write_event(Event::Start(e.to_owned()))?;
                        write_text_segments(&mut writer, replacement)?;
                        writer.write_event(Event::End(BytesEnd::new(name)))?;
                        out.extend_from_slice(&writer.into_inner().into_inner());
                    }
                    return Ok(());
                } else if depth == 1
                    && matches!(e.name().local_name().as_ref(), b"t" | b"tab" | b"br" | b"cr")
                {
                    // dropped; the replacement text covers it
                } else {
                    if depth == 1 && !in_run_props {
                        kept_children = true;
                    }
                    writer.write_event(Event::Empty(e.to_owned()))?;
                }
            }
            Event::End(ref e) => {
                depth -= 1;
                if let Some(from) = skip_from {
                    if depth == from {
                        skip_from = None;
                    }
                } else if depth == 0 {
                    if !replacement.is_empty() {
                        write_text_segments(&mut writer, replacement)?;
                    }
                    writer.write_event(Event::End(e.to_owned()))?;
                } else {
                    if depth == 1 && e.name().local_name().as_ref() == b"rPr" {
                        in_run_props = false;
                    }
                    writer.write_event(Event::End(e.to_owned()))?;
                }
            }
            Event::Eof => break,
            other => {
                if skip_from.is_none() {
                    writer.write_event(other.into_owned())?;
                }
            }
        }
        buf.clear();
    }

    if !replacement.is_empty() || kept_children {
        out.extend_from_slice(&writer.into_inner().into_inner());
    }
    Ok(())
}

/// Rewrite the original `word/document.xml` bytes against the mutated model.
///
/// Only two kinds of source nodes are touched: runs of modeled paragraphs
/// and cells get their text substituted via [`rewrite_run`], and paragraphs
/// marked removed are dropped whole. Everything between those nodes is
/// copied through verbatim, which is what keeps unmodeled structure —
/// `w:tblPr`, `w:tblGrid`, `w:sectPr`, drawings, hyperlinks, numbering —
/// intact in the output.
pub fn rewrite_document_xml(xml: &[u8], doc: &DocxDocument) -> Result<Vec<u8>> {
    let paragraphs: Vec<&Paragraph> = doc.paragraphs().collect();
    let tables: Vec<&Table> = doc.tables().collect();

    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut skip_buf = Vec::new();
    let mut out: Vec<u8> = Vec::with_capacity(xml.len());
    let mut copied = 0usize;

    // Cursors mirroring the reader's enumeration, so model elements line up
    // with their source nodes by position
    let mut body_para = 0usize;
    let mut table_seq = 0usize;
    let mut table_depth = 0usize;
    let mut current_table = 0usize;
    let mut row = 0usize;
    let mut next_row = 0usize;
    let mut col = 0usize;
    let mut next_col = 0usize;
    let mut in_cell = false;
    let mut cell_para = 0usize;
    let mut run_index = 0usize;
    let mut current: Option<&Paragraph> = None;

    loop {
        let event_start = reader.buffer_position() as usize;
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().local_name().as_ref() {
                b"p" => {
                    let model = next_model_paragraph(
                        &paragraphs,
                        &tables,
                        in_cell,
                        table_depth,
                        current_table,
                        row,
                        col,
                        &mut body_para,
                        &mut cell_para,
                    );
                    if model.is_some_and(|p| p.removed) {
                        out.extend_from_slice(&xml[copied..event_start]);
                        let name = e.name().as_ref().to_vec();
                        skip_buf.clear();
                        reader.read_to_end_into(QName(&name), &mut skip_buf)?;
                        copied = reader.buffer_position() as usize;
                        current = None;
                    } else {
                        current = model;
                        run_index = 0;
                    }
                }
                b"r" => {
                    if let Some(para) = current {
                        let text = para.runs.get(run_index).map(|r| r.text.clone());
                        run_index += 1;
                        out.extend_from_slice(&xml[copied..event_start]);
                        let name = e.name().as_ref().to_vec();
                        skip_buf.clear();
                        reader.read_to_end_into(QName(&name), &mut skip_buf)?;
                        let end = reader.buffer_position() as usize;
                        rewrite_run(&xml[event_start..end], text.as_deref(), &mut out)?;
                        copied = end;
                    }
                }
                b"tbl" => {
                    table_depth += 1;
                    if table_depth == 1 {
                        current_table = table_seq;
                        table_seq += 1;
                        next_row = 0;
                    }
                }
                b"tr" if table_depth == 1 => {
                    row = next_row;
                    next_row += 1;
                    next_col = 0;
                }
                b"tc" if table_depth == 1 => {
                    col = next_col;
                    next_col += 1;
                    in_cell = true;
                    cell_para = 0;
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.name().local_name().as_ref() {
                b"p" => {
                    // An empty paragraph still consumes its index
                    let model = next_model_paragraph(
                        &paragraphs,
                        &tables,
                        in_cell,
                        table_depth,
                        current_table,
                        row,
                        col,
                        &mut body_para,
                        &mut cell_para,
                    );
                    if model.is_some_and(|p| p.removed) {
                        out.extend_from_slice(&xml[copied..event_start]);
                        copied = reader.buffer_position() as usize;
                    }
                }
                b"r" => {
                    if let Some(para) = current {
                        let text = para.runs.get(run_index).map(|r| r.text.clone());
                        run_index += 1;
                        out.extend_from_slice(&xml[copied..event_start]);
                        let end = reader.buffer_position() as usize;
                        rewrite_run(&xml[event_start..end], text.as_deref(), &mut out)?;
                        copied = end;
                    }
                }
                _ => {}
            },
            Event::End(ref e) => match e.name().local_name().as_ref() {
                b"p" => current = None,
                b"tc" if table_depth == 1 => in_cell = false,
                b"tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    out.extend_from_slice(&xml[copied..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::parse_document_xml;

    #[test]
    fn test_serialize_roundTrip_shouldPreserveRunFormatting() {
        let mut doc = DocxDocument::default();
        let mut para = Paragraph::with_text("Hello ");
        para.runs.push(Run {
            text: "world".to_string(),
            props: crate::docx::RunProps { bold: true, ..Default::default() },
        });
        doc.blocks.push(Block::Paragraph(para));

        let xml = serialize_document_xml(&doc).unwrap();
        let parsed = parse_document_xml(&xml).unwrap();

        let paras: Vec<_> = parsed.paragraphs().collect();
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text(), "Hello world");
        assert_eq!(paras[0].runs.len(), 2);
        assert!(paras[0].runs[1].props.bold);
    }

    #[test]
    fn test_serialize_tabsAndBreaks_shouldRoundTrip() {
        let mut doc = DocxDocument::default();
        doc.blocks.push(Block::Paragraph(Paragraph::with_text("a\tb\nc")));

        let xml = serialize_document_xml(&doc).unwrap();
        let parsed = parse_document_xml(&xml).unwrap();

        assert_eq!(parsed.paragraphs().next().unwrap().text(), "a\tb\nc");
    }

    #[test]
    fn test_serialize_removedParagraph_shouldBeDropped() {
        let mut doc = DocxDocument::default();
        doc.blocks.push(Block::Paragraph(Paragraph::with_text("keep")));
        doc.blocks.push(Block::Paragraph(Paragraph {
            removed: true,
            ..Paragraph::with_text("drop")
        }));

        let xml = serialize_document_xml(&doc).unwrap();
        let parsed = parse_document_xml(&xml).unwrap();

        let paras: Vec<_> = parsed.paragraphs().collect();
        assert_eq!(paras.len(), 1);
        assert_eq!(paras[0].text(), "keep");
    }

    const DECORATED_XML: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
        r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
        r#"<w:body>"#,
        r#"<w:p><w:pPr><w:pStyle w:val="Heading 1"/><w:numPr><w:numId w:val="3"/></w:numPr></w:pPr>"#,
        r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Title</w:t></w:r></w:p>"#,
        r#"<w:tbl>"#,
        r#"<w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4"/></w:tblBorders></w:tblPr>"#,
        r#"<w:tblGrid><w:gridCol w:w="4788"/></w:tblGrid>"#,
        r#"<w:tr><w:tc><w:tcPr><w:tcW w:w="4788"/></w:tcPr>"#,
        r#"<w:p><w:r><w:t>Status</w:t></w:r></w:p></w:tc></w:tr>"#,
        r#"</w:tbl>"#,
        r#"<w:p><w:r><w:t>Figure: </w:t></w:r>"#,
        r#"<w:r><w:drawing><wp:inline><wp:extent cx="914400" cy="914400"/></wp:inline></w:drawing>"#,
        r#"<w:t>caption</w:t></w:r></w:p>"#,
        r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#,
        r#"</w:body></w:document>"#,
    );

    #[test]
    fn test_rewrite_unmodeledStructures_shouldSurviveVerbatim() {
        let doc = parse_document_xml(DECORATED_XML.as_bytes()).unwrap();

        let output = rewrite_document_xml(DECORATED_XML.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains(r#"<w:tblBorders><w:top w:val="single" w:sz="4"/></w:tblBorders>"#));
        assert!(output.contains(r#"<w:tblGrid><w:gridCol w:w="4788"/></w:tblGrid>"#));
        assert!(output.contains(r#"<w:tcPr><w:tcW w:w="4788"/></w:tcPr>"#));
        assert!(output.contains(r#"<w:numPr><w:numId w:val="3"/></w:numPr>"#));
        assert!(output.contains(r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#));
        assert!(output.contains("<w:drawing>"));
        assert!(output.contains("Title"));
        assert!(output.contains("Status"));
    }

    #[test]
    fn test_rewrite_substitutedText_shouldKeepRunProps() {
        let mut doc = parse_document_xml(DECORATED_XML.as_bytes()).unwrap();
        doc.paragraphs_mut()
            .next()
            .unwrap()
            .set_text_in_first_run("Titre");

        let output = rewrite_document_xml(DECORATED_XML.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains(r#"<w:rPr><w:b/></w:rPr>"#));
        assert!(output.contains("Titre"));
        assert!(!output.contains(">Title<"));
    }

    #[test]
    fn test_rewrite_cellText_shouldSubstituteInsideTable() {
        let mut doc = parse_document_xml(DECORATED_XML.as_bytes()).unwrap();
        let table = doc.tables_mut().next().unwrap();
        table.rows[0].cells[0].set_text("Statut", true);

        let output = rewrite_document_xml(DECORATED_XML.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains("Statut"));
        assert!(!output.contains("Status"));
        assert!(output.contains(r#"<w:tcPr><w:tcW w:w="4788"/></w:tcPr>"#));
    }

    #[test]
    fn test_rewrite_clearedRunWithDrawing_shouldKeepDrawing() {
        let mut doc = parse_document_xml(DECORATED_XML.as_bytes()).unwrap();
        let figure = doc.paragraphs_mut().nth(1).unwrap();
        assert_eq!(figure.text(), "Figure: caption");
        figure.set_text_in_first_run("Illustration : ");

        let output = rewrite_document_xml(DECORATED_XML.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        // The second run lost its caption text but not its image
        assert!(output.contains(
            r#"<w:drawing><wp:inline><wp:extent cx="914400" cy="914400"/></wp:inline></w:drawing>"#
        ));
        assert!(!output.contains("caption"));
        assert!(output.contains("Illustration : "));
    }

    #[test]
    fn test_rewrite_removedParagraph_shouldDropNode() {
        let mut doc = parse_document_xml(DECORATED_XML.as_bytes()).unwrap();
        doc.paragraphs_mut().next().unwrap().removed = true;

        let output = rewrite_document_xml(DECORATED_XML.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(!output.contains("Title"));
        // The table after the dropped paragraph is untouched
        assert!(output.contains("Status"));
        assert!(output.contains("<w:tblGrid>"));
    }

    #[test]
    fn test_rewrite_hyperlinkWrappedRun_shouldSubstituteInPlace() {
        let xml = concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:body><w:p>"#,
            r#"<w:hyperlink r:id="rId4" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<w:r><w:t>click here</w:t></w:r></w:hyperlink>"#,
            r#"</w:p></w:body></w:document>"#,
        );
        let mut doc = parse_document_xml(xml.as_bytes()).unwrap();
        assert_eq!(doc.paragraphs().next().unwrap().text(), "click here");
        doc.paragraphs_mut().next().unwrap().set_text_in_first_run("cliquez ici");

        let output = rewrite_document_xml(xml.as_bytes(), &doc).unwrap();
        let output = String::from_utf8(output).unwrap();

        assert!(output.contains(r#"<w:hyperlink r:id="rId4""#));
        assert!(output.contains("cliquez ici"));
        assert!(!output.contains("click here"));
    }

    #[test]
    fn test_rewrite_singleRunCollapse_shouldDropTrailingTextRuns() {
        let xml = concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
            r#"<w:body><w:p>"#,
            r#"<w:r><w:t>short </w:t></w:r><w:r><w:rPr><w:i/></w:rPr><w:t>tail</w:t></w:r>"#,
            r#"</w:p></w:body></w:document>"#,
        );
        let mut doc = parse_document_xml(xml.as_bytes()).unwrap();
        doc.paragraphs_mut()
            .next()
            .unwrap()
            .set_text_single_run("a much longer single translation");

        let output = rewrite_document_xml(xml.as_bytes(), &doc).unwrap();
        let parsed = parse_document_xml(&output).unwrap();

        let para = parsed.paragraphs().next().unwrap();
        assert_eq!(para.runs.len(), 1);
        assert_eq!(para.text(), "a much longer single translation");
    }
}
