use itertools::Itertools;

#[derive(thiserror::Error, Debug)]
pub enum ChannelError {
    #[error("instrument wavenumber grid is not strictly ascending at index {0}")]
    UnsortedGrid(usize),
    #[error("requested wavenumbers are not strictly ascending at index {0}")]
    UnsortedRequest(usize),
    #[error("wavenumbers not found in the instrument grid: {0:?}")]
    NotFound(Vec<f64>),
}
type Result<T> = std::result::Result<T, ChannelError>;

// index of the first out-of-order neighbor pair, if any
fn ascending_violation(values: &[f64]) -> Option<usize> {
    values.iter().tuple_windows().position(|(a, b)| a >= b)
}

/// Map each requested wavenumber to the index of the closest channel of the
/// instrument grid.
///
/// Both sequences must be strictly ascending and duplicate free. The scan
/// walks the grid once with a forward cursor, so the matched indexes come out
/// monotonically non-decreasing. A requested value falling strictly between
/// two grid points goes to the numerically closer one, an exact midpoint to
/// the lower index. With `tolerance` set, a closest match further away than
/// the tolerance counts as not found.
///
/// Any request left unmatched fails the whole call; the caller is expected
/// to abort the conversion rather than write a partial channel set.
pub fn match_wavenumbers(
    grid: &[f64],
    desired: &[f64],
    tolerance: Option<f64>,
) -> Result<Vec<usize>> {
    if let Some(index) = ascending_violation(grid) {
        return Err(ChannelError::UnsortedGrid(index));
    }
    if let Some(index) = ascending_violation(desired) {
        return Err(ChannelError::UnsortedRequest(index));
    }

    let mut found: Vec<Option<usize>> = vec![None; desired.len()];
    let mut target = 0;
    for index in 0..grid.len().saturating_sub(1) {
        while target < desired.len() {
            let wanted = desired[target];
            let matched = if wanted == grid[index] {
                Some(index)
            } else if wanted == grid[index + 1] {
                Some(index + 1)
            } else if wanted > grid[index] && wanted < grid[index + 1] {
                if wanted - grid[index] <= grid[index + 1] - wanted {
                    Some(index)
                } else {
                    Some(index + 1)
                }
            } else {
                None
            };
            match matched {
                Some(hit) => {
                    // the hit is the globally closest grid point; if it is
                    // still outside the tolerance the request is hopeless
                    if tolerance.map_or(true, |tol| (grid[hit] - wanted).abs() <= tol) {
                        found[target] = Some(hit);
                    }
                    target += 1;
                }
                None => break,
            }
        }
    }

    let misses: Vec<f64> = found
        .iter()
        .zip(desired)
        .filter_map(|(hit, &wanted)| hit.is_none().then_some(wanted))
        .collect();
    if !misses.is_empty() {
        return Err(ChannelError::NotFound(misses));
    }
    Ok(found.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_values_map_to_their_own_indexes() {
        let grid = [580.0, 581.951, 582.433837, 585.80886, 586.29101562, 593.5];
        let desired = [581.951, 585.80886, 593.5];
        let indexes = match_wavenumbers(&grid, &desired, None).unwrap();
        assert_eq!(indexes, vec![1, 3, 5]);
    }

    #[test]
    fn straddling_value_goes_to_the_closer_neighbor() {
        let grid = [670.0, 670.625, 671.25];
        // 670.9 is 0.275 from 670.625 and 0.35 from 671.25
        let indexes = match_wavenumbers(&grid, &[670.9], None).unwrap();
        assert_eq!(indexes, vec![1]);
    }

    #[test]
    fn midpoint_goes_to_the_lower_index() {
        let grid = [1.0, 2.0];
        let indexes = match_wavenumbers(&grid, &[1.5], None).unwrap();
        assert_eq!(indexes, vec![0]);
    }

    #[test]
    fn several_requests_inside_one_interval() {
        let grid = [0.0, 10.0];
        let indexes = match_wavenumbers(&grid, &[1.0, 4.0, 9.0], None).unwrap();
        assert_eq!(indexes, vec![0, 0, 1]);
    }

    #[test]
    fn matched_indexes_are_monotonic() {
        let grid = [100.0, 100.5, 101.0, 101.5, 102.0];
        let desired = [100.1, 100.6, 101.2, 101.9];
        let indexes = match_wavenumbers(&grid, &desired, None).unwrap();
        assert!(indexes.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn out_of_grid_request_is_reported() {
        let grid = [670.0, 670.625, 671.25];
        match match_wavenumbers(&grid, &[670.625, 900.0], None) {
            Err(ChannelError::NotFound(misses)) => assert_eq!(misses, vec![900.0]),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn below_grid_request_stalls_the_forward_cursor() {
        // the scan never revisits earlier grid indexes, so a request below
        // the grid blocks every request behind it; the error reports them all
        let grid = [670.0, 670.625, 671.25];
        match match_wavenumbers(&grid, &[669.0, 670.625], None) {
            Err(ChannelError::NotFound(misses)) => assert_eq!(misses, vec![669.0, 670.625]),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn tolerance_rejects_a_distant_closest_match() {
        let grid = [670.0, 670.625, 671.25];
        assert!(match_wavenumbers(&grid, &[670.9], Some(0.1)).is_err());
        assert_eq!(
            match_wavenumbers(&grid, &[670.9], Some(0.3)).unwrap(),
            vec![1]
        );
    }

    #[test]
    fn unsorted_inputs_are_refused() {
        assert!(matches!(
            match_wavenumbers(&[1.0, 1.0, 2.0], &[1.0], None),
            Err(ChannelError::UnsortedGrid(0))
        ));
        assert!(matches!(
            match_wavenumbers(&[1.0, 2.0, 3.0], &[2.0, 1.0], None),
            Err(ChannelError::UnsortedRequest(0))
        ));
    }

    #[test]
    fn rerunning_on_own_output_is_the_identity() {
        let grid = [670.0, 670.625, 671.25, 672.0, 673.5];
        let desired = [670.9, 672.2];
        let indexes = match_wavenumbers(&grid, &desired, None).unwrap();
        let selected: Vec<f64> = indexes.iter().map(|&i| grid[i]).collect();
        let again = match_wavenumbers(&selected, &selected, None).unwrap();
        assert_eq!(again, (0..selected.len()).collect::<Vec<_>>());
    }

    #[test]
    fn empty_request_matches_nothing() {
        let grid = [1.0, 2.0];
        assert!(match_wavenumbers(&grid, &[], None).unwrap().is_empty());
    }
}
