//! Well-known integer resource-type IDs and their label names.

/// Maps the integer IDs 1..24 used at the Resource Type level of the
/// resource tree to their well-known label. Every other ID (including 13
/// and 15, deliberately skipped by the Windows resource-type numbering)
/// resolves to `None`.
pub fn resolve_resource_id(id: u32) -> Option<&'static str> {
    match id {
        1 => Some("Cursor"),
        2 => Some("Bitmap"),
        3 => Some("Icon"),
        4 => Some("Menu"),
        5 => Some("Dialog"),
        6 => Some("String"),
        7 => Some("FontDirectory"),
        8 => Some("Font"),
        9 => Some("Accelerator"),
        10 => Some("RcData"),
        11 => Some("MessageTable"),
        12 => Some("GroupCursor"),
        14 => Some("GroupIcon"),
        16 => Some("Version"),
        17 => Some("DlgInclude"),
        19 => Some("PlugAndPlay"),
        20 => Some("VXD"),
        21 => Some("AnimatedCursor"),
        22 => Some("AnimatedIcon"),
        23 => Some("HTML"),
        24 => Some("Manifest"),
        _ => None,
    }
}
