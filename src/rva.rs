//! Translates an image-relative virtual address (RVA) to a raw file offset,
//! given a section-header vector — and a full virtual address (VA) to an
//! RVA, given the image base.

use crate::error::{Error, Result};
use crate::headers::section_header::SectionHeader;

/// Resolves `rva` to a raw file offset by scanning `sections`.
///
/// First pass: find a section `S` with `S.virtual_address <= rva <
/// S.virtual_address + S.virtual_size`. Second pass (only if the first
/// finds nothing): scan in reverse and accept `S.virtual_address <= rva <=
/// S.virtual_address + S.virtual_size` (inclusive upper bound), tolerating
/// RVAs that land exactly at the end of a section. The resolver does not
/// assume sections are ordered by RVA — it always scans.
pub fn resolve_rva(rva: u32, sections: &[SectionHeader]) -> Result<usize> {
    if sections.is_empty() {
        return Err(Error::invalid_argument(
            "cannot resolve an RVA against an empty section-header vector",
        ));
    }

    log::trace!("resolving rva 0x{:08x} against {} section(s)", rva, sections.len());

    for section in sections {
        let start = section.virtual_address()?;
        let size = section.virtual_size()?;
        if rva >= start && (rva as u64) < start as u64 + size as u64 {
            let raw_pointer = section.pointer_to_raw_data()?;
            return Ok((rva - start) as usize + raw_pointer as usize);
        }
    }

    for section in sections.iter().rev() {
        let start = section.virtual_address()?;
        let size = section.virtual_size()?;
        if rva >= start && (rva as u64) <= start as u64 + size as u64 {
            let raw_pointer = section.pointer_to_raw_data()?;
            log::debug!(
                "rva 0x{:08x} resolved via end-of-section fallback against section at 0x{:08x}",
                rva,
                start
            );
            return Ok((rva as u64 - start as u64) as usize + raw_pointer as usize);
        }
    }

    Err(Error::resolution(rva))
}

/// Resolves a full virtual address to a raw file offset by subtracting the
/// image base (read from the section-header vector, per the design note in
/// spec.md §4.2) and delegating to [`resolve_rva`].
pub fn resolve_va(va: u64, sections: &[SectionHeader]) -> Result<usize> {
    if sections.is_empty() {
        return Err(Error::invalid_argument(
            "cannot resolve a VA against an empty section-header vector",
        ));
    }
    let image_base = sections[0].image_base();
    let rva = va
        .checked_sub(image_base)
        .ok_or_else(|| Error::invalid_argument("virtual address is below the image base"))?;
    resolve_rva(rva as u32, sections)
}
