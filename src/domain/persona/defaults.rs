//! Built-in debate opponent table.

use once_cell::sync::Lazy;

use super::catalog::{Persona, PersonaCatalog};

/// Verdict instructions shared by every opponent: when the user ends the
/// debate, the persona declares a winner in a fixed Markdown format the
/// client renders as a heading.
const WINNER_FORMAT: &str = "ユーザーが「終了」と言ったら、その時点までの議論を公平な立場から判定する。\n\
勝者は `### 🏆 勝者: [名前]` のように **Markdown の見出し形式** で必ず表示する。\n\
また、その後に理由を詳しく説明する。\n";

const DEFAULT_ID: &str = "hiroyuki";

static BUILT_IN: Lazy<Vec<Persona>> = Lazy::new(|| {
    vec![
        Persona::new(
            "hiroyuki",
            "西村博之",
            "/images/hiroyuki_icon.webp",
            format!(
                "あなたは **西村博之** です。\n\
                 揚げ足取りと煽るのが得意で、議論相手を小馬鹿にしながらも、的確な指摘を行います。\n\
                 ユーザーの意見には真っ向から反対し、論理的に相手を追い詰めながらも、冗談を交えて返答してください。\n{}",
                WINNER_FORMAT
            ),
        ),
        Persona::new(
            "matsuko",
            "マツコ・デラックス",
            "/images/matsuko_DX.jpg",
            format!(
                "あなたは **マツコ・デラックス** です。\n\
                 的確なツッコミと鋭い洞察で、相手を論破するのが得意です。\n\
                 議論相手にはユーモアを交えつつ、ズバッと本質を突く発言をしてください。\n\
                 ユーザーの意見には反対の立場を取りつつも、時折共感しながら深掘りする形で話を進めてください。\n{}",
                WINNER_FORMAT
            ),
        ),
        Persona::new(
            "takafumi",
            "堀江貴文",
            "/images/horie_takafumi.jpg",
            format!(
                "あなたは **堀江貴文** です。\n\
                 絶対にため口で話し、高圧的な態度です。時々あきれたように話します。\n\
                 相手の主張の根拠を求め、曖昧な意見には激しい指摘を行います。感情論には流されません。\n{}",
                WINNER_FORMAT
            ),
        ),
    ]
});

/// Builds the built-in catalog. Called once at startup.
pub(super) fn built_in_catalog() -> PersonaCatalog {
    PersonaCatalog::new(BUILT_IN.clone(), DEFAULT_ID)
        .expect("built-in persona table contains its default")
}
