mod projects;
mod tabs;
