/*!
 * Structural decomposition of a document into three anchor-aligned layers.
 *
 * - `layers`: content / format / layout descriptor types and anchors
 * - `parser`: the parser producing all three layers in one traversal
 */

pub use self::layers::{
    Anchor, ContentUnit, DocumentMetadata, DocumentStructure, FormatDescriptor, LayoutDescriptor,
    RunFormat, TableCoordinates, UnitKind,
};
pub use self::parser::StructuralParser;

pub mod layers;
pub mod parser;
