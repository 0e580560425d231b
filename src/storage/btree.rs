//! Leaf insertion, leaf splitting, and root promotion.
//!
//! Internal-node splitting is out of scope: once the root has been promoted
//! to an internal node with two leaf children, a subsequent split of either
//! leaf that would require splitting the internal node is a fatal error
//! instead of a recursive rebalance.

use tracing::{debug, warn};

use crate::errors::Error;
use crate::storage::cursor::Cursor;
use crate::storage::node::{self, LEAF_NODE_LEFT_SPLIT_COUNT, LEAF_NODE_MAX_CELLS};
use crate::storage::pager::TABLE_MAX_PAGES;
use crate::storage::row::{Row, ROW_SIZE};

/// A leaf split allocates a new leaf, and possibly a further page for root
/// promotion; refuse before touching anything if there isn't room for both.
const PAGES_NEEDED_FOR_SPLIT: u32 = 2;

/// Inserts `row` at the cursor's position, splitting the leaf first if full.
///
/// The caller must have positioned `cursor` via `Cursor::find` with the
/// row's key, and must have already rejected a duplicate key.
pub fn insert(cursor: &mut Cursor, row: &Row) -> Result<(), Error> {
    let page_num = cursor.page_num;
    let cell_num = cursor.cell_num;

    let num_cells = {
        let page = cursor.table.pager.get(page_num)?;
        node::leaf_num_cells(page)
    };

    if num_cells as usize >= LEAF_NODE_MAX_CELLS {
        if cursor.table.pager.num_pages() + PAGES_NEEDED_FOR_SPLIT > TABLE_MAX_PAGES as u32 {
            return Err(Error::TableFull);
        }
        warn!(page_num, num_cells, "leaf full, splitting");
        return split_and_insert(cursor, row);
    }

    let mut row_bytes = [0u8; ROW_SIZE];
    row.serialize(&mut row_bytes);

    let page = cursor.table.pager.get_mut(page_num)?;
    for i in (cell_num + 1..=num_cells).rev() {
        let prev = node::leaf_cell(page, i - 1).to_vec();
        node::copy_leaf_cell(page, i, &prev);
    }
    node::set_leaf_num_cells(page, num_cells + 1);
    node::set_leaf_key(page, cell_num, row.id);
    node::leaf_value_mut(page, cell_num).copy_from_slice(&row_bytes);

    Ok(())
}

fn split_and_insert(cursor: &mut Cursor, row: &Row) -> Result<(), Error> {
    let old_page_num = cursor.page_num;
    let new_page_num = cursor.table.pager.get_unused_page_num();
    let cell_num = cursor.cell_num;

    let mut row_bytes = [0u8; ROW_SIZE];
    row.serialize(&mut row_bytes);

    let old_cells: Vec<Vec<u8>> = {
        let old_page = cursor.table.pager.get(old_page_num)?;
        (0..LEAF_NODE_MAX_CELLS as u32)
            .map(|i| node::leaf_cell(old_page, i).to_vec())
            .collect()
    };
    let old_is_root = {
        let old_page = cursor.table.pager.get(old_page_num)?;
        node::is_root(old_page)
    };
    let old_parent = {
        let old_page = cursor.table.pager.get(old_page_num)?;
        node::parent_pointer(old_page)
    };

    {
        let new_page = cursor.table.pager.get_mut(new_page_num)?;
        node::initialize_leaf(new_page);
    }

    // All existing cells plus the new one are distributed evenly between the
    // old (left) and new (right) pages, starting from the right so the
    // insertion point doesn't overwrite a cell before it's been copied out.
    for i in (0..=LEAF_NODE_MAX_CELLS as u32).rev() {
        let dest_is_new = i as usize >= LEAF_NODE_LEFT_SPLIT_COUNT;
        let dest_page_num = if dest_is_new { new_page_num } else { old_page_num };
        let dest_cell_num = i % LEAF_NODE_LEFT_SPLIT_COUNT as u32;

        let dest_page = cursor.table.pager.get_mut(dest_page_num)?;
        if i == cell_num {
            node::set_leaf_key(dest_page, dest_cell_num, row.id);
            node::leaf_value_mut(dest_page, dest_cell_num).copy_from_slice(&row_bytes);
        } else {
            let source_index = if i > cell_num { i - 1 } else { i };
            node::copy_leaf_cell(dest_page, dest_cell_num, &old_cells[source_index as usize]);
        }
    }

    {
        let old_page = cursor.table.pager.get_mut(old_page_num)?;
        node::set_leaf_num_cells(old_page, LEAF_NODE_LEFT_SPLIT_COUNT as u32);
    }
    {
        let new_page = cursor.table.pager.get_mut(new_page_num)?;
        node::set_leaf_num_cells(
            new_page,
            (LEAF_NODE_MAX_CELLS + 1 - LEAF_NODE_LEFT_SPLIT_COUNT) as u32,
        );
        node::set_parent_pointer(new_page, old_parent);
    }

    if old_is_root {
        create_new_root(cursor, old_page_num, new_page_num)
    } else {
        Err(Error::Storage(
            "splitting a non-root leaf is not supported".into(),
        ))
    }
}

/// Promotes `old_page_num`'s contents into a fresh left child, re-initializes
/// the old page as the new internal root, and points it at `old_page_num`
/// (now holding the left half) and `new_page_num` (the right half).
fn create_new_root(cursor: &mut Cursor, old_page_num: u32, new_page_num: u32) -> Result<(), Error> {
    debug!(old_page_num, new_page_num, "promoting root to internal node");
    let root_page_num = cursor.table.root_page_num;
    debug_assert_eq!(root_page_num, old_page_num);

    let left_page_num = cursor.table.pager.get_unused_page_num();
    let old_root_copy = *cursor.table.pager.get(old_page_num)?;

    {
        let left = cursor.table.pager.get_mut(left_page_num)?;
        *left = old_root_copy;
        node::set_is_root(left, false);
    }

    let left_max_key = node::max_key(cursor.table.pager.get(left_page_num)?);

    let root = cursor.table.pager.get_mut(root_page_num)?;
    node::initialize_internal(root);
    node::set_is_root(root, true);
    node::set_internal_num_keys(root, 1);
    node::set_internal_child(root, 0, left_page_num);
    node::set_internal_key(root, 0, left_max_key);
    node::set_internal_right_child(root, new_page_num);

    {
        let left = cursor.table.pager.get_mut(left_page_num)?;
        node::set_parent_pointer(left, root_page_num);
    }
    {
        let right = cursor.table.pager.get_mut(new_page_num)?;
        node::set_parent_pointer(right, root_page_num);
    }

    Ok(())
}
