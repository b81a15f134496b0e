use crate::error::Error;
use crate::model::{BuildRequest, ContentBlock, Placement, TableRegions};

use super::table::cell_for;

/// Destination of the block at `index`.
///
/// Table regions win over header and footer. A blank first or last block is
/// omitted. A missing block is fatal.
pub fn resolve(
    index: usize,
    block: Option<&ContentBlock>,
    request_size: usize,
    regions: &TableRegions,
) -> Result<Placement, Error> {
    resolve_block(index, block, request_size, regions).map(|(placement, _)| placement)
}

/// Like [`resolve`], also handing back the block that was checked to be present.
pub fn resolve_block<'b>(
    index: usize,
    block: Option<&'b ContentBlock>,
    request_size: usize,
    regions: &TableRegions,
) -> Result<(Placement, &'b ContentBlock), Error> {
    let Some(block) = block else {
        return Err(Error::MalformedContent { index });
    };
    placement_of(index, block, request_size, regions).map(|placement| (placement, block))
}

fn placement_of(
    index: usize,
    block: &ContentBlock,
    request_size: usize,
    regions: &TableRegions,
) -> Result<Placement, Error> {
    if let Some((id, region)) = regions.region_for(index) {
        let (row, col) = cell_for(region, index);
        return Ok(Placement::TableCell {
            region: id,
            row,
            col,
        });
    }

    let is_first = index == 0;
    let is_last = index + 1 == request_size;
    if (is_first || is_last) && block.is_blank() {
        return Ok(Placement::Omitted);
    }
    if is_first {
        Ok(Placement::Header)
    } else if is_last {
        Ok(Placement::Footer)
    } else {
        Ok(Placement::Body)
    }
}

/// Placements of every content index, in order.
pub fn resolve_all(request: &BuildRequest, regions: &TableRegions) -> Result<Vec<Placement>, Error> {
    request
        .content
        .iter()
        .enumerate()
        .map(|(index, block)| resolve(index, block.as_ref(), request.len(), regions))
        .collect()
}
