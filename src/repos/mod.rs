pub mod drink_repo;
pub mod error;
pub mod memory_drink_repo;
pub mod pg_drink_repo;

pub use drink_repo::{Drink, DrinkPatch, DrinkRepo, Ingredient, NewDrink};
pub use memory_drink_repo::MemoryDrinkRepo;
pub use pg_drink_repo::PgDrinkRepo;
