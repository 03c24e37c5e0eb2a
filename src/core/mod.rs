pub mod db;
pub mod password;
pub mod seeder;
pub mod settings;
pub mod tournament;
