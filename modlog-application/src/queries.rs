pub mod player_queries;
