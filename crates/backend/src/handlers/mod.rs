pub mod d400_helpdesk_summary;
pub mod u501_sync_from_sheets;
