use lazy_static::lazy_static;

use crate::common::VideoSummary;

fn entry(id: &str, title: &str, author: &str, views: &str) -> VideoSummary {
    let mut v = VideoSummary::new(id, title, author);
    v.views = Some(views.into());
    v
}

lazy_static! {
    /// Shown on the landing page when no mirror answers, so it is never empty
    pub static ref TRENDING: Vec<VideoSummary> = vec![
        entry("dQw4w9WgXcQ", "Rick Astley - Never Gonna Give You Up", "Rick Astley", "17億 回視聴"),
        entry("kJQP7kiw5Fk", "Luis Fonsi - Despacito ft. Daddy Yankee", "Luis Fonsi", "80億 回視聴"),
        entry("JGwWNGJdvx8", "Ed Sheeran - Shape of You", "Ed Sheeran", "64億 回視聴"),
        entry("RgKAFK5djSk", "Wiz Khalifa - See You Again ft. Charlie Puth", "Wiz Khalifa", "60億 回視聴"),
        entry("OPf0YbXqDm0", "Mark Ronson - Uptown Funk ft. Bruno Mars", "Mark Ronson", "50億 回視聴"),
        entry("lp-EO5I60KA", "PPAP (Pen Pineapple Apple Pen)", "Pikotaro", "4億 回視聴"),
        entry("9bZkp7q19f0", "PSY - Gangnam Style", "PSY", "50億 回視聴"),
        entry("XqZsoesa55w", "Baby Shark Dance", "Pinkfong", "150億 回視聴"),
        entry("fJ9rUzIMcZQ", "Queen - Bohemian Rhapsody", "Queen Official", "16億 回視聴"),
        entry("CevxZvSJLk8", "Katy Perry - Roar", "Katy Perry", "40億 回視聴"),
        entry("YQHsXMglC9A", "Adele - Hello", "Adele", "33億 回視聴"),
        entry("hT_nvWreIhg", "OneRepublic - Counting Stars", "OneRepublic", "40億 回視聴"),
    ];
}
