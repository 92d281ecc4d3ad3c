pub mod d400_helpdesk_summary;
