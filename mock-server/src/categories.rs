//! Fixed category tree served by `categories/list`.

/// A top-level category: display name only, plus its sub-categories as
/// `(name, display_name)` pairs.
#[derive(Debug, Clone, Copy)]
pub struct CategoryGroup {
    pub display_name: &'static str,
    pub sub_categories: &'static [(&'static str, &'static str)],
}

pub const CATEGORIES: &[CategoryGroup] = &[
    CategoryGroup {
        display_name: "時間・歴史",
        sub_categories: &[
            ("personal", "自分史"),
            ("history", "歴史"),
            ("anniversary", "記念日"),
            ("event", "イベント"),
        ],
    },
    CategoryGroup {
        display_name: "エンターテインメント",
        sub_categories: &[("music", "音楽"), ("movie", "映画"), ("game", "ゲーム")],
    },
    CategoryGroup {
        display_name: "スポーツ",
        sub_categories: &[("baseball", "野球"), ("soccer", "サッカー")],
    },
    CategoryGroup {
        display_name: "ニュース",
        sub_categories: &[("politics", "政治"), ("economy", "経済"), ("society", "社会")],
    },
    CategoryGroup {
        display_name: "趣味",
        sub_categories: &[("travel", "旅行"), ("food", "グルメ")],
    },
    CategoryGroup {
        display_name: "学び",
        sub_categories: &[("study", "勉強"), ("science", "科学")],
    },
    CategoryGroup {
        display_name: "ビジネス",
        sub_categories: &[
            ("company", "企業"),
            ("industry", "業界"),
            ("market", "市場"),
            ("work", "仕事"),
        ],
    },
];
