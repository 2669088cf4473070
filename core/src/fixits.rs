use indexlink_types::{BufferId, Fixit, ListItem};

use crate::host::Host;

/// Title of the location list listing applied fixits.
pub const FIXITS_LIST_TITLE: &str = "indexlink fixits applied";

/// Apply `fixits` to the host buffer in the order given and return one list
/// item per applied fixit.
///
/// Each fixit is spliced into the line as it stands at that moment. Fixits
/// that target the same line are not re-based on one another, so earlier
/// splices can shift later columns. Fixits past the end of the buffer are
/// skipped.
pub fn apply_fixits<H: Host + ?Sized>(
    host: &mut H,
    buffer: BufferId,
    path: &str,
    fixits: &[Fixit],
) -> Vec<ListItem> {
    let mut applied = Vec::with_capacity(fixits.len());
    for fixit in fixits {
        let index = fixit.line_index();
        let Some(line) = host.buffer_line(buffer, index) else {
            tracing::warn!(line = fixit.line(), "Fixit targets a line past the end of {path}");
            continue;
        };
        host.set_buffer_line(buffer, index, fixit.apply(&line));
        applied.push(ListItem::new(fixit.line(), fixit.col(), fixit.text(), path));
    }
    applied
}
