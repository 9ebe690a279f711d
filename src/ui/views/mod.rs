mod todo_list;

pub use todo_list::draw_todo_list;
