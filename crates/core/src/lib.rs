pub mod detection {
    pub mod domain {
        pub mod detection;
        pub mod detector_config;
        pub mod face_detector;
        pub mod face_landmarks;
        pub mod landmark_index;
    }
    pub mod infrastructure;
}

pub mod overlay {
    pub mod domain {
        pub mod display_surface;
        pub mod draw_command;
        pub mod geometry_mapper;
        pub mod overlay_strategy;
        pub mod render_mode;
        pub mod sprite_placement;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod detection_loop;
    pub mod latency_tracker;
    pub mod loop_logger;
    pub mod overlay_settings;
}

pub mod shared {
    pub mod color;
    pub mod constants;
    pub mod frame;
    pub mod geometry;
    pub mod video_metadata;
}

pub mod video {
    pub mod domain {
        pub mod capture_source;
        pub mod image_writer;
    }
    pub mod infrastructure;
}
