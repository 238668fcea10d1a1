pub mod monitoring;
pub mod supabase;
