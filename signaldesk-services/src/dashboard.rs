//! Persistence for the signal board rows.

use signaldesk_core::board::SignalBoard;
use signaldesk_core::domain::SignalRow;

use crate::repository::Collection;
use crate::store::StoreError;

pub struct DashboardService {
    rows: Collection<SignalRow>,
}

impl DashboardService {
    pub fn new(rows: Collection<SignalRow>) -> Self {
        Self { rows }
    }

    pub fn load_board(&self) -> SignalBoard {
        SignalBoard::from_rows(self.rows.list())
    }

    pub fn save_board(&self, board: &SignalBoard) -> Result<(), StoreError> {
        self.rows.replace(board.rows().to_vec()).map(|_| ())
    }
}
