/*!
 * DOCX package handling.
 *
 * A DOCX file is a zip package; the only entry this crate interprets is
 * `word/document.xml`. Everything else (styles, media, relationships) is
 * carried through byte-for-byte so the output package keeps whatever the
 * input had.
 *
 * - `package`: zip read/write with entry passthrough
 * - `model`: in-memory paragraph/run/table representation
 * - `reader`: `word/document.xml` -> model
 * - `writer`: model -> `word/document.xml`, either by rewriting the
 *   original bytes in place (text substitution only) or by regenerating
 *   the part from the model
 */

pub use self::model::{Block, DocxDocument, Paragraph, Run, RunProps, Table, TableCell, TableRow};
pub use self::package::DocxPackage;
pub use self::reader::parse_document_xml;
pub use self::writer::{rewrite_document_xml, serialize_document_xml};

pub mod model;
pub mod package;
pub mod reader;
pub mod writer;
