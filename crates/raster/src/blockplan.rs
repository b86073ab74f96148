/// One row-band of the plan: `nrows` rows starting at `row_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpec {
    pub row_start: i32,
    pub nrows: i32,
}

impl BlockSpec {
    pub fn row_end(&self) -> i32 {
        self.row_start + self.nrows
    }
}

/// A finite, ordered partition of `[0, nrow)` into contiguous row-bands.
///
/// Every band has `nrows >= minrows`, except when `nrow < minrows` itself, in which case
/// the plan is a single band spanning the whole grid. The planner sizes bands from a
/// memory budget and the per-cell working-set size so the engine never has to hold more
/// than one band (plus small carry vectors) in memory at a time.
#[derive(Debug, Clone)]
pub struct BlockPlan {
    blocks: Vec<BlockSpec>,
}

impl BlockPlan {
    /// `cell_working_set_bytes` is the memory one cell costs across every buffer the
    /// operator keeps alive for a block (distance, friction, carry rows amortized in).
    pub fn new(nrow: i32, ncol: i32, cell_working_set_bytes: usize, memory_budget_bytes: usize, minrows: i32) -> Self {
        assert!(nrow >= 1, "nrow must be >= 1");
        assert!(ncol >= 1, "ncol must be >= 1");
        assert!(minrows >= 1, "minrows must be >= 1");

        if nrow <= minrows {
            return BlockPlan {
                blocks: vec![BlockSpec { row_start: 0, nrows: nrow }],
            };
        }

        let bytes_per_row = (cell_working_set_bytes as u64).saturating_mul(ncol as u64).max(1);
        let rows_per_block = ((memory_budget_bytes as u64 / bytes_per_row) as i32).max(minrows);

        let mut blocks = Vec::new();
        let mut row = 0;
        while row < nrow {
            let remaining = nrow - row;
            let mut nrows = rows_per_block.min(remaining);
            // Don't leave a dangling tail thinner than the floor; fold it into this band instead.
            if remaining - nrows > 0 && remaining - nrows < minrows {
                nrows = remaining;
            }
            blocks.push(BlockSpec { row_start: row, nrows });
            row += nrows;
        }

        BlockPlan { blocks }
    }

    /// A plan with a single band spanning the whole grid, for operators or tests that
    /// don't need block-streaming (e.g. small in-memory grids).
    pub fn whole_grid(nrow: i32) -> Self {
        BlockPlan {
            blocks: vec![BlockSpec { row_start: 0, nrows: nrow }],
        }
    }

    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers_exactly(plan: &BlockPlan, nrow: i32) {
        let mut row = 0;
        for block in plan.blocks() {
            assert_eq!(block.row_start, row, "blocks must be contiguous");
            assert!(block.nrows > 0);
            row = block.row_end();
        }
        assert_eq!(row, nrow, "plan must cover the whole grid exactly once");
    }

    #[test]
    fn small_grid_below_minrows_is_a_single_block() {
        let plan = BlockPlan::new(2, 10, 8, 1024, 3);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.blocks()[0], BlockSpec { row_start: 0, nrows: 2 });
    }

    #[test]
    fn large_grid_is_partitioned_with_minrows_floor() {
        let plan = BlockPlan::new(1000, 100, 8, 4096, 4);
        assert_covers_exactly(&plan, 1000);
        for block in plan.blocks() {
            assert!(block.nrows >= 4 || plan.len() == 1);
        }
    }

    #[test]
    fn tiny_memory_budget_still_respects_minrows() {
        let plan = BlockPlan::new(50, 1000, 8, 1, 5);
        assert_covers_exactly(&plan, 50);
        assert!(plan.blocks().iter().all(|b| b.nrows >= 5));
    }

    #[test]
    fn whole_grid_plan_is_a_single_block() {
        let plan = BlockPlan::whole_grid(37);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.blocks()[0].nrows, 37);
    }
}
