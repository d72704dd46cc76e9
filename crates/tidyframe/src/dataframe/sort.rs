use std::cmp::Ordering;

use arrow::array::UInt32Array;

use crate::dataframe::{Column, ColumnData};

/// Stable row permutation ordering by `keys` left to right.
///
/// Missing cells sort last in both directions.
pub(crate) fn sort_indices(keys: &[&Column], descending: bool) -> UInt32Array {
    let len = keys.first().map(|c| c.len()).unwrap_or(0);
    let mut indices: Vec<u32> = (0..len as u32).collect();
    indices.sort_by(|&a, &b| {
        keys.iter()
            .map(|k| compare_cells(k.data(), a as usize, b as usize, descending))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    UInt32Array::from(indices)
}

fn compare_cells(data: &ColumnData, a: usize, b: usize, descending: bool) -> Ordering {
    let array = data.as_array();
    match (array.is_null(a), array.is_null(b)) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ord = match data {
        ColumnData::Double(v) => v.value(a).total_cmp(&v.value(b)),
        ColumnData::Int(v) => v.value(a).cmp(&v.value(b)),
        ColumnData::Bool(v) => v.value(a).cmp(&v.value(b)),
        ColumnData::Text(v) => v.value(a).cmp(v.value(b)),
    };
    if descending {
        ord.reverse()
    } else {
        ord
    }
}
