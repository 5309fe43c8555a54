use log::*;
use payment_gateway_engine::{
    settlement::{run_settlement_worker, SettlementConfig, SettlementJob},
    SqliteDatabase,
};
use tokio::{sync::mpsc, task::JoinHandle};

/// Starts the settlement worker. Do not await the returned JoinHandle: the queue only closes
/// when every producer is dropped, which for the server is the lifetime of the process.
pub fn start_settlement_worker(
    db: SqliteDatabase,
    config: SettlementConfig,
    jobs: mpsc::Receiver<SettlementJob>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("🏦️ Settlement worker started");
        run_settlement_worker(db, config, jobs).await;
        info!("🏦️ Settlement worker has shut down");
    })
}
