//! Segment command implementation.

use super::Context;
use crate::cli::SegmentArgs;
use crate::document::read_document;
use crate::error::Result;
use crate::output::Formatter;
use lorekeeper_extractor::Segmenter;

/// Execute the segment command.
pub fn execute_segment(args: SegmentArgs, ctx: &Context, formatter: &Formatter) -> Result<()> {
    let text = read_document(&args.file)?;
    let config = ctx.extractor_config(args.max_chunk_length)?;
    let chunks = Segmenter::new(config.segmenter).segment(&text);

    println!("{}", formatter.format_chunks(&chunks)?);
    Ok(())
}
