//! Report label strings, one table per language.
//!
//! The renderer is language-agnostic: everything a reader sees apart from
//! article content and the narrative comes from a [`LocaleText`].

use crate::models::Sentiment;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Languages the report can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Korean,
    Spanish,
}

/// Every label used by the Markdown renderer.
#[derive(Debug)]
pub struct LocaleText {
    pub header: &'static str,
    pub date_label: &'static str,
    /// chrono format string for the report date.
    pub date_format: &'static str,
    pub topic_label: &'static str,
    pub executive_summary: &'static str,
    pub sentiment_chart: &'static str,
    pub chart_sentiment_column: &'static str,
    pub chart_count_column: &'static str,
    pub chart_share_column: &'static str,
    pub analyzed_label: &'static str,
    pub filtered_label: &'static str,
    pub dropped_label: &'static str,
    pub key_highlights: &'static str,
    pub positive_title: &'static str,
    pub negative_title: &'static str,
    pub source_label: &'static str,
    pub title_label: &'static str,
    pub summary_label: &'static str,
    pub view_more_positive: &'static str,
    pub view_more_negative: &'static str,
    pub no_positive: &'static str,
    pub no_negative: &'static str,
    pub expert_insight: &'static str,
    pub failure_title: &'static str,
    pub failure_body: &'static str,
    pub sentiment_positive: &'static str,
    pub sentiment_neutral: &'static str,
    pub sentiment_negative: &'static str,
    pub footer: &'static str,
}

impl LocaleText {
    pub fn sentiment(&self, sentiment: Sentiment) -> &'static str {
        match sentiment {
            Sentiment::Positive => self.sentiment_positive,
            Sentiment::Neutral => self.sentiment_neutral,
            Sentiment::Negative => self.sentiment_negative,
        }
    }
}

static ENGLISH: LocaleText = LocaleText {
    header: "📊 News Sentiment Report",
    date_label: "Date",
    date_format: "%B %d, %Y",
    topic_label: "Topic",
    executive_summary: "## 🔍 Executive Summary\n\nThis report provides an automated sentiment analysis of recent news articles related to the selected topic. Below you'll find a breakdown of media sentiment, the most notable coverage on each side, and a short interpretation of the narrative.",
    sentiment_chart: "## 📈 Sentiment Breakdown",
    chart_sentiment_column: "Sentiment",
    chart_count_column: "Articles",
    chart_share_column: "Share",
    analyzed_label: "Articles analyzed",
    filtered_label: "Filtered out",
    dropped_label: "Could not be classified",
    key_highlights: "## 📰 Key News Highlights",
    positive_title: "### ✅ Positive Coverage",
    negative_title: "### ⚠️ Negative Coverage",
    source_label: "Source",
    title_label: "Title",
    summary_label: "Summary",
    view_more_positive: "View more positive news",
    view_more_negative: "View more negative news",
    no_positive: "_No positive news found._",
    no_negative: "_No negative news found._",
    expert_insight: "## 💡 Interpretation",
    failure_title: "## ⛔ Could not retrieve news",
    failure_body: "The analysis could not be completed, so no report was produced. Please try again later.",
    sentiment_positive: "Positive",
    sentiment_neutral: "Neutral",
    sentiment_negative: "Negative",
    footer: "<small>Generated by news_sentiment_report</small>",
};

static KOREAN: LocaleText = LocaleText {
    header: "📊 뉴스 감정 분석 리포트",
    date_label: "날짜",
    date_format: "%Y년 %m월 %d일",
    topic_label: "주제",
    executive_summary: "## 🔍 핵심 요약\n\n이 보고서는 자동화된 감정 분석을 통해 선택한 주제에 관한 최근 뉴스의 흐름과 내러티브를 정리했습니다.",
    sentiment_chart: "## 📈 감정 분포 차트",
    chart_sentiment_column: "감정",
    chart_count_column: "기사 수",
    chart_share_column: "비율",
    analyzed_label: "분석된 기사",
    filtered_label: "제외된 기사",
    dropped_label: "분류 실패",
    key_highlights: "## 📰 주요 뉴스",
    positive_title: "### ✅ 긍정 뉴스 요약",
    negative_title: "### ⚠️ 부정 뉴스 요약",
    source_label: "출처",
    title_label: "제목",
    summary_label: "요약",
    view_more_positive: "긍정 뉴스 더 보기",
    view_more_negative: "부정 뉴스 더 보기",
    no_positive: "_긍정 뉴스가 없습니다._",
    no_negative: "_부정 뉴스가 없습니다._",
    expert_insight: "## 💡 해석",
    failure_title: "## ⛔ 뉴스를 가져올 수 없습니다",
    failure_body: "분석을 완료하지 못해 보고서를 생성하지 않았습니다. 잠시 후 다시 시도해 주세요.",
    sentiment_positive: "긍정",
    sentiment_neutral: "중립",
    sentiment_negative: "부정",
    footer: "<small>news_sentiment_report 생성</small>",
};

static SPANISH: LocaleText = LocaleText {
    header: "📊 Informe de Sentimiento de Noticias",
    date_label: "Fecha",
    date_format: "%d/%m/%Y",
    topic_label: "Tema",
    executive_summary: "## 🔍 Resumen Ejecutivo\n\nEste informe proporciona un análisis de sentimiento automatizado sobre las noticias recientes relacionadas con el tema seleccionado.",
    sentiment_chart: "## 📈 Distribución de Sentimiento",
    chart_sentiment_column: "Sentimiento",
    chart_count_column: "Artículos",
    chart_share_column: "Proporción",
    analyzed_label: "Artículos analizados",
    filtered_label: "Descartados",
    dropped_label: "Sin clasificar",
    key_highlights: "## 📰 Noticias Destacadas",
    positive_title: "### ✅ Cobertura Positiva",
    negative_title: "### ⚠️ Cobertura Negativa",
    source_label: "Fuente",
    title_label: "Título",
    summary_label: "Resumen",
    view_more_positive: "Ver más noticias positivas",
    view_more_negative: "Ver más noticias negativas",
    no_positive: "_No se encontraron noticias positivas._",
    no_negative: "_No se encontraron noticias negativas._",
    expert_insight: "## 💡 Interpretación",
    failure_title: "## ⛔ No se pudieron obtener las noticias",
    failure_body: "El análisis no pudo completarse y no se generó ningún informe. Inténtelo de nuevo más tarde.",
    sentiment_positive: "Positivo",
    sentiment_neutral: "Neutral",
    sentiment_negative: "Negativo",
    footer: "<small>Generado por news_sentiment_report</small>",
};

impl Language {
    pub fn text(self) -> &'static LocaleText {
        match self {
            Language::English => &ENGLISH,
            Language::Korean => &KOREAN,
            Language::Spanish => &SPANISH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_labels() {
        for language in [Language::English, Language::Korean, Language::Spanish] {
            let text = language.text();
            assert!(text.header.starts_with("📊"));
            assert!(text.sentiment_chart.starts_with("## "));
            assert!(text.positive_title.starts_with("### "));
            for s in Sentiment::ALL {
                assert!(!text.sentiment(s).is_empty());
            }
        }
    }

    #[test]
    fn test_language_value_names() {
        assert_eq!(Language::from_str("korean", true).unwrap(), Language::Korean);
        assert_eq!(Language::default(), Language::English);
    }
}
