//! In-place quicksort over record slots
//!
//! Two-pointer Hoare partition, pivot taken from the middle slot of each
//! sub-range. Equal keys are not kept in input order.

use crate::record::RecordSlice;

/// Sort every record in the slice by key
pub fn quicksort(records: &mut RecordSlice<'_>) {
    if records.len() > 1 {
        sort_range(records, 0, records.len() as isize - 1);
    }
}

/// Sort slots `low..=high`
///
/// Recurses into the smaller partition and loops on the larger one, keeping
/// stack depth logarithmic.
fn sort_range(records: &mut RecordSlice<'_>, mut low: isize, mut high: isize) {
    while low < high {
        let (i, j) = partition(records, low, high);

        if j - low < high - i {
            sort_range(records, low, j);
            low = i;
        } else {
            sort_range(records, i, high);
            high = j;
        }
    }
}

/// Partition `low..=high` around the key of the middle slot
///
/// Returns `(i, j)` with `j < i`: slots `low..=j` hold keys <= pivot and
/// slots `i..=high` hold keys >= pivot.
fn partition(records: &mut RecordSlice<'_>, low: isize, high: isize) -> (isize, isize) {
    let pivot = records.key(((low + high) / 2) as usize);
    let (mut i, mut j) = (low, high);

    while i <= j {
        while records.key(i as usize) < pivot {
            i += 1;
        }
        while records.key(j as usize) > pivot {
            j -= 1;
        }

        if i <= j {
            records.swap(i as usize, j as usize);
            i += 1;
            j -= 1;
        }
    }

    (i, j)
}
