//! Application services for the blog and ticket modules.

pub mod blog_service;
pub mod ticket_service;

pub use blog_service::{
    BlogError, BlogService, BlogServiceImpl, CategoryDto, CreateCategoryCommand,
    CreatePostCommand, EditCategoryCommand, EditPostCommand, PostDto,
};
pub use ticket_service::{
    CreateTicketCommand, SendTicketMessageCommand, TicketDto, TicketError, TicketMessageDto,
    TicketService, TicketServiceImpl,
};
