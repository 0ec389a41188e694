//! Cluster sizing and stratum selection for clustered arrangements

use crate::rng::SimRng;

use super::ContaminationError;

/// Partition `target` contaminated units into cluster sizes, each bounded
/// by `units_per_cluster`: all clusters but the last have the maximum size
/// and the last takes the remainder.
pub(super) fn split_into_cluster_sizes(target: usize, units_per_cluster: usize) -> Vec<usize> {
    if target <= units_per_cluster {
        return vec![target];
    }
    let mut cluster_sizes = Vec::new();
    let mut placed = 0;
    while placed < target - units_per_cluster {
        cluster_sizes.push(units_per_cluster);
        placed += units_per_cluster;
    }
    cluster_sizes.push(target - placed);
    cluster_sizes
}

/// Divide the unit array into strata wide enough for clusters so that
/// clusters never overlap, and pick one stratum per cluster.
///
/// If the array does not divide evenly by `stratum_width`, the remainder
/// forms one narrower stratum at the end. That stratum matters for very
/// high contamination rates where nearly every unit must be hit; when not
/// all strata are needed, it is excluded so every chosen stratum can hold
/// a full-sized cluster.
pub(super) fn choose_strata_for_clusters(
    num_units: usize,
    stratum_width: usize,
    num_clusters: usize,
    rng: &mut SimRng,
) -> Result<Vec<usize>, ContaminationError> {
    let num_strata = num_units.div_ceil(stratum_width).max(1);
    if num_strata < num_clusters {
        return Err(ContaminationError::ClustersOverlap {
            num_clusters,
            num_strata,
        });
    }
    if num_clusters == num_strata {
        return Ok((0..num_strata).collect());
    }
    let selectable = if num_units % stratum_width == 0 {
        num_strata
    } else {
        num_strata - 1
    };
    if selectable < num_clusters {
        return Err(ContaminationError::ClustersOverlap {
            num_clusters,
            num_strata: selectable,
        });
    }
    Ok(rng.sample_without_replacement(selectable, num_clusters))
}
