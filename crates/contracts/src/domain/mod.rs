pub mod a001_ticket;
